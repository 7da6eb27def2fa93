//! Chat panel controller
//!
//! Owns the settings, transcript and input buffer for one panel, and runs
//! the send sequence: validate, echo the message, build context and prompt,
//! dispatch, then render the reply when the UI thread polls for it.

use crate::actions::PanelAction;
use crate::context::build_context;
use crate::dispatch::{submit, Dispatcher, PendingReply};
use crate::editor::EditorHost;
use crate::prompts::build_prompt;
use providers::{reply_text, TextGenerator};
use shared::chat::{Sender, Transcript};
use shared::settings::{AnalysisScope, ChatMode, Settings};
use shared::store::SettingsStore;
use tracing::{debug, info, warn};

pub const WELCOME_MESSAGE: &str =
    "Welcome to Gemini AI Agent! Select a mode and scope, then start chatting.";

pub const CONFIGURE_KEY_MESSAGE: &str =
    "Please configure your Gemini API key in Settings > Gemini AI Agent";

pub const REVIEW_SUGGESTIONS_MESSAGE: &str =
    "Code suggestions received. Review the changes above.";

const CODE_FENCE: &str = "```";

/// What a call to [`ChatPanel::send`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming
    Ignored,
    /// A request from this panel is still in flight
    Busy,
    /// No API key; a system note was added instead
    NotConfigured,
    /// The prompt was handed to the dispatcher
    Dispatched,
}

struct InFlight {
    reply: PendingReply,
    mode: ChatMode,
}

pub struct ChatPanel<G> {
    settings: Settings,
    store: Box<dyn SettingsStore>,
    client: G,
    dispatcher: Box<dyn Dispatcher>,
    transcript: Transcript,
    input: String,
    in_flight: Option<InFlight>,
}

impl<G> ChatPanel<G>
where
    G: TextGenerator + Clone + 'static,
{
    /// Build a panel around already-loaded settings. The client is configured
    /// from `settings.api_key`.
    pub fn new(
        settings: Settings,
        store: Box<dyn SettingsStore>,
        mut client: G,
        dispatcher: Box<dyn Dispatcher>,
    ) -> Self {
        client.configure(&settings.api_key);
        let mut transcript = Transcript::new();
        transcript.push(Sender::System, WELCOME_MESSAGE);

        Self {
            settings,
            store,
            client,
            dispatcher,
            transcript,
            input: String::new(),
            in_flight: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &G {
        &self.client
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The send control is disabled while a reply is outstanding.
    pub fn can_send(&self) -> bool {
        !self.is_waiting()
    }

    pub fn set_chat_mode(&mut self, mode: ChatMode) {
        if self.settings.chat_mode != mode {
            self.settings.chat_mode = mode;
            self.persist();
        }
    }

    pub fn set_analysis_scope(&mut self, scope: AnalysisScope) {
        if self.settings.analysis_scope != scope {
            self.settings.analysis_scope = scope;
            self.persist();
        }
    }

    /// Apply a trigger action's mode and scope. The caller shows the panel.
    pub fn apply_action(&mut self, action: PanelAction) {
        action.apply(&mut self.settings);
        self.persist();
    }

    /// Store a new key and reconfigure the client with it.
    pub fn apply_api_key(&mut self, api_key: &str) {
        self.settings.api_key = api_key.to_string();
        self.client.configure(api_key);
        self.persist();
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            warn!("failed to save settings: {}", e);
        }
    }

    /// Send the current input.
    pub fn send(&mut self, editor: &dyn EditorHost) -> SendOutcome {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        if self.is_waiting() {
            return SendOutcome::Busy;
        }

        if !self.client.is_configured() {
            self.transcript.push(Sender::System, CONFIGURE_KEY_MESSAGE);
            return SendOutcome::NotConfigured;
        }

        self.transcript.push(Sender::User, message.as_str());
        self.input.clear();

        let mode = self.settings.chat_mode;
        let context = build_context(self.settings.analysis_scope, editor);
        let prompt = build_prompt(&context, &message, mode);
        debug!(
            ?mode,
            scope = ?self.settings.analysis_scope,
            prompt_chars = prompt.chars().count(),
            "dispatching prompt"
        );

        info!(?mode, "sending message to gemini");
        let client = self.client.clone();
        let reply = submit(self.dispatcher.as_ref(), move || {
            client.generate_blocking(&prompt)
        });
        self.in_flight = Some(InFlight { reply, mode });

        SendOutcome::Dispatched
    }

    /// Collect a finished reply, if any. Call from the UI thread.
    ///
    /// Returns true when the transcript changed.
    pub fn poll_reply(&mut self) -> bool {
        let Some(in_flight) = &self.in_flight else {
            return false;
        };
        let Some(reply) = in_flight.reply.try_take() else {
            return false;
        };
        let mode = in_flight.mode;
        self.in_flight = None;

        if let Err(e) = &reply {
            info!("request failed: {}", e);
        }
        let text = reply_text(reply);
        let suggests_code = mode == ChatMode::Edit && text.contains(CODE_FENCE);

        self.transcript.push(Sender::Gemini, text);
        if suggests_code {
            self.transcript.push(Sender::System, REVIEW_SUGGESTIONS_MESSAGE);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NO_FILE_OPEN;
    use crate::dispatch::InlineDispatcher;
    use crate::editor::{ActiveFile, StaticEditor};
    use async_trait::async_trait;
    use providers::ProviderError;
    use shared::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeGemini {
        configured: bool,
        reply: Result<String, String>,
        calls: Arc<AtomicUsize>,
        last_prompt: Arc<Mutex<Option<String>>>,
    }

    impl FakeGemini {
        fn replying(text: &str) -> Self {
            Self {
                configured: false,
                reply: Ok(text.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
                last_prompt: Arc::new(Mutex::new(None)),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                ..Self::replying("")
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> String {
            self.last_prompt.lock().unwrap().clone().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGemini {
        fn configure(&mut self, api_key: &str) {
            self.configured = !api_key.trim().is_empty();
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            self.generate_blocking(prompt)
        }

        fn generate_blocking(&self, prompt: &str) -> Result<String, ProviderError> {
            if !self.configured {
                return Err(ProviderError::NotConfigured);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.reply.clone().map_err(ProviderError::Runtime)
        }
    }

    fn panel_with(fake: &FakeGemini, api_key: &str) -> ChatPanel<FakeGemini> {
        let settings = Settings {
            api_key: api_key.to_string(),
            ..Settings::default()
        };
        ChatPanel::new(
            settings,
            Box::new(MemoryStore::new()),
            fake.clone(),
            Box::new(InlineDispatcher),
        )
    }

    fn editor() -> StaticEditor {
        StaticEditor {
            file: Some(ActiveFile::new("Main.kt", "fun main() = println(\"hi\")")),
            ..StaticEditor::default()
        }
    }

    #[test]
    fn test_new_panel_shows_welcome() {
        let fake = FakeGemini::replying("ok");
        let panel = panel_with(&fake, "");
        assert_eq!(panel.transcript().len(), 1);
        assert_eq!(panel.transcript().entries()[0].text, WELCOME_MESSAGE);
        assert!(!panel.client().is_configured());
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let fake = FakeGemini::replying("ok");
        let mut panel = panel_with(&fake, "key");
        let before = panel.transcript().len();

        panel.set_input("   \n ");
        assert_eq!(panel.send(&editor()), SendOutcome::Ignored);
        assert_eq!(panel.transcript().len(), before);
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_unconfigured_adds_one_system_entry() {
        let fake = FakeGemini::replying("ok");
        let mut panel = panel_with(&fake, "  ");
        let before = panel.transcript().len();

        panel.set_input("what is this?");
        assert_eq!(panel.send(&editor()), SendOutcome::NotConfigured);

        assert_eq!(panel.transcript().len(), before + 1);
        let last = panel.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::System);
        assert_eq!(last.text, CONFIGURE_KEY_MESSAGE);
        assert_eq!(panel.input(), "what is this?");
        assert!(!panel.poll_reply());
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_ask_round_trip() {
        let fake = FakeGemini::replying("It prints hi.");
        let mut panel = panel_with(&fake, "key");
        panel.clear_transcript();

        panel.set_input("  what does this do?  ");
        assert_eq!(panel.send(&editor()), SendOutcome::Dispatched);

        // Message is echoed and input cleared before the reply is collected.
        assert_eq!(panel.transcript().len(), 1);
        assert_eq!(panel.transcript().entries()[0].sender, Sender::User);
        assert_eq!(panel.transcript().entries()[0].text, "what does this do?");
        assert_eq!(panel.input(), "");
        assert!(!panel.can_send());

        assert!(panel.poll_reply());
        assert!(panel.can_send());
        assert_eq!(panel.transcript().len(), 2);
        let reply = panel.transcript().last().unwrap();
        assert_eq!(reply.sender, Sender::Gemini);
        assert_eq!(reply.text, "It prints hi.");

        let prompt = fake.last_prompt();
        assert!(prompt.contains("Current File: Main.kt"));
        assert!(prompt.contains("User Question:\nwhat does this do?"));
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_file_scope_without_open_file_still_sends() {
        let fake = FakeGemini::replying("ok");
        let mut panel = panel_with(&fake, "key");

        panel.set_input("hello");
        assert_eq!(panel.send(&StaticEditor::default()), SendOutcome::Dispatched);
        assert!(panel.poll_reply());
        assert!(fake.last_prompt().contains(NO_FILE_OPEN));
    }

    #[test]
    fn test_edit_reply_with_code_gets_review_note() {
        let fake = FakeGemini::replying("Try:\n```rust\nfn main() {}\n```");
        let mut panel = panel_with(&fake, "key");
        panel.set_chat_mode(ChatMode::Edit);
        panel.clear_transcript();

        panel.set_input("make it rust");
        panel.send(&editor());
        panel.poll_reply();

        let entries = panel.transcript().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].sender, Sender::Gemini);
        assert_eq!(entries[2].sender, Sender::System);
        assert_eq!(entries[2].text, REVIEW_SUGGESTIONS_MESSAGE);
        assert!(fake.last_prompt().contains("User Request:"));
    }

    #[test]
    fn test_ask_reply_with_code_gets_no_note() {
        let fake = FakeGemini::replying("```\ncode\n```");
        let mut panel = panel_with(&fake, "key");
        panel.clear_transcript();

        panel.set_input("show me");
        panel.send(&editor());
        panel.poll_reply();
        assert_eq!(panel.transcript().len(), 2);
    }

    #[test]
    fn test_failure_is_rendered_as_error_text() {
        let fake = FakeGemini::failing("connection refused");
        let mut panel = panel_with(&fake, "key");

        panel.set_input("hi");
        panel.send(&editor());
        panel.poll_reply();

        let last = panel.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Gemini);
        assert_eq!(last.text, "Error: connection refused");
        assert!(panel.can_send());
    }

    #[test]
    fn test_second_send_while_waiting_is_refused() {
        let fake = FakeGemini::replying("ok");
        let mut panel = panel_with(&fake, "key");

        panel.set_input("first");
        assert_eq!(panel.send(&editor()), SendOutcome::Dispatched);
        panel.set_input("second");
        assert_eq!(panel.send(&editor()), SendOutcome::Busy);
        assert_eq!(panel.input(), "second");
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_codebase_scope_uses_project() {
        let fake = FakeGemini::replying("ok");
        let mut panel = panel_with(&fake, "key");
        panel.set_analysis_scope(AnalysisScope::Codebase);

        let mut editor = editor();
        editor.project.name = "demo".into();
        panel.set_input("overview?");
        panel.send(&editor);
        assert!(fake.last_prompt().contains("Project: demo"));
        assert!(!fake.last_prompt().contains("Main.kt"));
    }

    #[test]
    fn test_settings_changes_are_persisted() {
        let store = Arc::new(MemoryStore::new());
        let fake = FakeGemini::replying("ok");
        let mut panel = ChatPanel::new(
            Settings::default(),
            Box::new(store.clone()),
            fake,
            Box::new(InlineDispatcher),
        );

        panel.apply_api_key("new-key");
        assert!(panel.client().is_configured());
        assert_eq!(store.saved().unwrap().api_key, "new-key");

        panel.set_analysis_scope(AnalysisScope::Codebase);
        panel.apply_action(PanelAction::Edit);
        let saved = store.saved().unwrap();
        assert_eq!(saved.chat_mode, ChatMode::Edit);
        assert_eq!(saved.analysis_scope, AnalysisScope::File);

        panel.apply_api_key("");
        assert!(!panel.client().is_configured());
    }
}
