//! Editor actions that open the panel in a given mode.

use crate::editor::EditorHost;
use shared::settings::{AnalysisScope, ChatMode, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// "Ask Gemini"
    Ask,
    /// "Edit with Gemini"
    Edit,
}

impl PanelAction {
    pub fn label(&self) -> &'static str {
        match self {
            PanelAction::Ask => "Ask Gemini",
            PanelAction::Edit => "Edit with Gemini",
        }
    }

    pub fn chat_mode(&self) -> ChatMode {
        match self {
            PanelAction::Ask => ChatMode::Ask,
            PanelAction::Edit => ChatMode::Edit,
        }
    }

    /// Actions need an open file to make sense.
    pub fn is_enabled(&self, editor: &dyn EditorHost) -> bool {
        editor.active_file().is_some()
    }

    /// Force the mode and file scope. Never sends anything.
    pub fn apply(&self, settings: &mut Settings) {
        settings.chat_mode = self.chat_mode();
        settings.analysis_scope = AnalysisScope::File;
    }
}
