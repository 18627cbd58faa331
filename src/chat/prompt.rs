//! Chat prompt rendering and response unwrapping

use crate::types::{ChatMessage, ChatRole};

/// Instruction substituted when the caller supplies no prior messages
pub const FRESH_CONVERSATION_INSTRUCTION: &str =
    "This is the start of a fresh conversation; there is no prior history to draw on.";

/// Format the prior conversation for the prompt
pub fn format_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the chat prompt by substituting the template placeholders.
///
/// An empty history gets the explicit fresh-conversation instruction rather
/// than an empty history block.
pub fn render_chat_prompt(
    template: &str,
    document_content: &str,
    history: &[ChatMessage],
    user_message: &str,
) -> String {
    let (history_block, fresh_instruction) = if history.is_empty() {
        ("(none)".to_string(), FRESH_CONVERSATION_INSTRUCTION)
    } else {
        (format_history(history), "")
    };

    template
        .replace("{{DOCUMENT_CONTENT}}", document_content)
        .replace("{{CONVERSATION_HISTORY}}", &history_block)
        .replace("{{USER_MESSAGE}}", user_message)
        .replace("{{FRESH_CONVERSATION_INSTRUCTION}}", fresh_instruction)
}

/// Strip fenced-code wrapping from a raw model response.
///
/// Models routinely wrap JSON answers in ``` fences, with or without a
/// language tag; the payload between the fences is returned unchanged.
pub fn clean_response_wrapper(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => rest,
        };
    }

    let trimmed = text.trim_end();
    if let Some(rest) = trimmed.strip_suffix("```") {
        text = rest;
    }

    text.trim().to_string()
}
