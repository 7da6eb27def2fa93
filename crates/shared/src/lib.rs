pub mod store;

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_MODEL: &str = "gemini-pro";

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    /// Chat mode determines how Gemini is asked to respond.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum ChatMode {
        /// Questions about the code, no modifications expected
        #[default]
        Ask,
        /// Code modifications returned as fenced suggestions
        Edit,
    }

    impl ChatMode {
        pub fn all() -> &'static [ChatMode] {
            &[ChatMode::Ask, ChatMode::Edit]
        }

        pub fn display_name(&self) -> &'static str {
            match self {
                ChatMode::Ask => "Ask Mode",
                ChatMode::Edit => "Edit Mode",
            }
        }
    }

    /// Analysis scope determines what context is sent along with a prompt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum AnalysisScope {
        /// Only the active file (or its selection)
        #[default]
        File,
        /// The whole project
        Codebase,
    }

    impl AnalysisScope {
        pub fn all() -> &'static [AnalysisScope] {
            &[AnalysisScope::File, AnalysisScope::Codebase]
        }

        pub fn display_name(&self) -> &'static str {
            match self {
                AnalysisScope::File => "File Level",
                AnalysisScope::Codebase => "Codebase Level",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Settings {
        #[serde(default)]
        pub api_key: String,
        #[serde(default)]
        pub chat_mode: ChatMode,
        #[serde(default)]
        pub analysis_scope: AnalysisScope,
        #[serde(default = "default_model")]
        pub model: String, // e.g., "gemini-pro", "gemini-1.5-flash"
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_key: String::new(),
                chat_mode: ChatMode::default(),
                analysis_scope: AnalysisScope::default(),
                model: default_model(),
            }
        }
    }

    impl Settings {
        pub fn has_api_key(&self) -> bool {
            !self.api_key.trim().is_empty()
        }
    }
}

pub mod chat {
    use std::fmt;

    /// Who a transcript entry is attributed to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Sender {
        User,
        Gemini,
        System,
    }

    impl Sender {
        pub fn label(&self) -> &'static str {
            match self {
                Sender::User => "You",
                Sender::Gemini => "Gemini",
                Sender::System => "System",
            }
        }
    }

    /// A single transcript entry
    #[derive(Debug, Clone, PartialEq)]
    pub struct ChatMessage {
        pub sender: Sender,
        pub text: String,
        pub timestamp: String,
    }

    impl ChatMessage {
        pub fn new(sender: Sender, text: impl Into<String>) -> Self {
            Self {
                sender,
                text: text.into(),
                timestamp: chrono::Local::now().format("%H:%M").to_string(),
            }
        }
    }

    impl fmt::Display for ChatMessage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}: {}", self.sender.label(), self.text)
        }
    }

    /// Append-only list of entries shown in one panel session.
    #[derive(Debug, Clone, Default)]
    pub struct Transcript {
        entries: Vec<ChatMessage>,
    }

    impl Transcript {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
            self.entries.push(ChatMessage::new(sender, text));
        }

        pub fn entries(&self) -> &[ChatMessage] {
            &self.entries
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        pub fn last(&self) -> Option<&ChatMessage> {
            self.entries.last()
        }

        /// Wipe the display. Entries are never edited in place.
        pub fn clear(&mut self) {
            self.entries.clear();
        }

        /// Plain-text rendering, one `sender: text` block per entry.
        pub fn render(&self) -> String {
            self.entries
                .iter()
                .map(|m| format!("{}\n\n", m))
                .collect()
        }
    }
}
