//! Mode-specific prompt templates.

use shared::settings::ChatMode;

const ASK_INSTRUCTION: &str = "Please provide a helpful answer based on the context provided.";

const EDIT_INSTRUCTION: &str = "Please provide code modifications or suggestions. \
Format your code suggestions using markdown code blocks (```).\n\
Be specific about what changes should be made and why.";

/// Combine context, user message and mode into the final prompt.
pub fn build_prompt(context: &str, message: &str, mode: ChatMode) -> String {
    let (heading, instruction) = match mode {
        ChatMode::Ask => ("User Question", ASK_INSTRUCTION),
        ChatMode::Edit => ("User Request", EDIT_INSTRUCTION),
    };

    format!(
        "Context:\n{context}\n\n{heading}:\n{message}\n\n{instruction}",
        context = context.trim_end(),
    )
}
