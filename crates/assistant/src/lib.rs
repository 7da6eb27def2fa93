//! Assistant core for the Gemini side panel
//!
//! This crate turns editor state and a user message into a Gemini prompt and
//! runs the request off the UI thread:
//! - Read the active file, selection, or project from an [`EditorHost`]
//! - Build the context and prompt for the current chat mode
//! - Dispatch the call and deliver the reply back to the panel transcript

pub mod actions;
pub mod context;
pub mod dispatch;
pub mod editor;
pub mod panel;
pub mod prompts;

pub use actions::PanelAction;
pub use context::{build_context, NO_FILE_OPEN};
pub use dispatch::{Dispatcher, InlineDispatcher, ThreadDispatcher};
pub use editor::{ActiveFile, EditorHost, ProjectInfo};
pub use panel::{ChatPanel, SendOutcome};
pub use prompts::build_prompt;
