//! Context loader for prompts
//!
//! File scope sends the selection, or the head of the active file.
//! Codebase scope only describes the project; there is no indexing.

use crate::editor::{ActiveFile, EditorHost, ProjectInfo};
use shared::settings::AnalysisScope;

/// Sentinel context when file scope is selected but nothing is open.
pub const NO_FILE_OPEN: &str = "No file is currently open.";

/// Maximum characters of file content included without a selection.
pub const MAX_FILE_CHARS: usize = 2000;

pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Build the context block for `scope` from the editor's current state.
pub fn build_context(scope: AnalysisScope, editor: &dyn EditorHost) -> String {
    match scope {
        AnalysisScope::File => match editor.active_file() {
            Some(file) => file_context(&file),
            None => NO_FILE_OPEN.to_string(),
        },
        AnalysisScope::Codebase => codebase_context(&editor.project()),
    }
}

pub fn file_context(file: &ActiveFile) -> String {
    let mut context = format!("Current File: {}\n", file.name);

    match &file.selection {
        Some(selection) => {
            context.push_str("Selected Code:\n");
            context.push_str(selection);
            context.push('\n');
        }
        None => {
            context.push_str("File Content:\n");
            let mut chars = file.text.chars();
            context.extend(chars.by_ref().take(MAX_FILE_CHARS));
            context.push('\n');
            if chars.next().is_some() {
                context.push_str(TRUNCATION_MARKER);
                context.push('\n');
            }
        }
    }

    context
}

pub fn codebase_context(project: &ProjectInfo) -> String {
    let root = project
        .root
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    format!(
        "Project: {}\nPath: {}\n(Codebase-level analysis - consider the entire project structure)\n",
        project.name, root
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::StaticEditor;
    use std::path::PathBuf;

    fn editor_with(file: Option<ActiveFile>) -> StaticEditor {
        StaticEditor {
            file,
            project: ProjectInfo {
                name: "demo".into(),
                root: Some(PathBuf::from("/work/demo")),
            },
        }
    }

    #[test]
    fn test_no_file_open() {
        let editor = editor_with(None);
        assert_eq!(build_context(AnalysisScope::File, &editor), "No file is currently open.");
    }

    #[test]
    fn test_long_file_is_truncated() {
        let text = format!("{}{}", "a".repeat(2000), "b".repeat(500));
        let editor = editor_with(Some(ActiveFile::new("Main.kt", text)));

        let context = build_context(AnalysisScope::File, &editor);
        assert!(context.starts_with("Current File: Main.kt\n"));
        assert!(context.contains(&"a".repeat(2000)));
        assert!(!context.contains('b'));
        assert!(context.contains("... (truncated)"));
    }

    #[test]
    fn test_short_file_is_not_truncated() {
        let text = "x".repeat(2000);
        let editor = editor_with(Some(ActiveFile::new("lib.rs", text.clone())));

        let context = build_context(AnalysisScope::File, &editor);
        assert!(context.contains(&text));
        assert!(!context.contains("truncated"));
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = "é".repeat(2001);
        let context = file_context(&ActiveFile::new("notes.txt", text));
        assert_eq!(context.matches('é').count(), 2000);
        assert!(context.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn test_selection_wins_over_file_text() {
        let file = ActiveFile::new("lib.rs", "y".repeat(3000)).with_selection("fn main() {}");
        let context = file_context(&file);
        assert_eq!(context, "Current File: lib.rs\nSelected Code:\nfn main() {}\n");
    }

    #[test]
    fn test_codebase_context() {
        let editor = editor_with(Some(ActiveFile::new("lib.rs", "ignored")));
        let context = build_context(AnalysisScope::Codebase, &editor);
        assert!(context.contains("Project: demo\n"));
        assert!(context.contains("Path: /work/demo\n"));
        assert!(context.contains("Codebase-level analysis"));
        assert!(!context.contains("ignored"));
    }

    #[test]
    fn test_codebase_context_without_root() {
        let context = codebase_context(&ProjectInfo {
            name: "scratch".into(),
            root: None,
        });
        assert!(context.contains("Path: \n"));
    }
}
