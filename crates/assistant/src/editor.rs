//! Read-only view of the host editor.

use std::path::PathBuf;

/// The file currently focused in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFile {
    pub name: String,
    pub text: String,
    /// Selected text, if the user has a non-empty selection
    pub selection: Option<String>,
}

impl ActiveFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = Some(selection.into());
        self
    }
}

/// The open project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectInfo {
    pub name: String,
    pub root: Option<PathBuf>,
}

/// What the assistant may read from the editor. Nothing is ever written back.
pub trait EditorHost {
    fn active_file(&self) -> Option<ActiveFile>;
    fn project(&self) -> ProjectInfo;
}

/// Fixed editor state, handy for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct StaticEditor {
    pub file: Option<ActiveFile>,
    pub project: ProjectInfo,
}

impl EditorHost for StaticEditor {
    fn active_file(&self) -> Option<ActiveFile> {
        self.file.clone()
    }

    fn project(&self) -> ProjectInfo {
        self.project.clone()
    }
}
