//! File-backed editor state for the desktop app
//!
//! Tracks the project directory, the file shown in the editor pane, and the
//! user's current selection in it. The assistant reads this through
//! [`EditorHost`].

use anyhow::{Context, Result};
use assistant::{ActiveFile, EditorHost, ProjectInfo};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// The file open in the editor pane.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub path: PathBuf,
    pub text: String,
    /// Selected char range, if any
    pub selection: Option<Range<usize>>,
}

impl OpenFile {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection.as_ref()?;
        if range.is_empty() {
            return None;
        }
        let text: String = self
            .text
            .chars()
            .skip(range.start)
            .take(range.end - range.start)
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub struct Workspace {
    root: PathBuf,
    name: String,
    open: Option<OpenFile>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        Self {
            root,
            name,
            open: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load `path` into the editor pane. Relative paths resolve against the project root.
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        tracing::info!(path = %path.display(), chars = text.chars().count(), "opened file");
        self.open = Some(OpenFile {
            path,
            text,
            selection: None,
        });
        Ok(())
    }

    pub fn close_file(&mut self) {
        self.open = None;
    }

    pub fn open_file_mut(&mut self) -> Option<&mut OpenFile> {
        self.open.as_mut()
    }
}

impl EditorHost for Workspace {
    fn active_file(&self) -> Option<ActiveFile> {
        let file = self.open.as_ref()?;
        Some(ActiveFile {
            name: file.name(),
            text: file.text.clone(),
            selection: file.selected_text(),
        })
    }

    fn project(&self) -> ProjectInfo {
        ProjectInfo {
            name: self.name.clone(),
            root: Some(self.root.clone()),
        }
    }
}
