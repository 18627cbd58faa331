//! Chat message types
//!
//! Conversation history is supplied by the caller on each invocation; the
//! core does not persist messages.

use serde::{Deserialize, Serialize};

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A pointer into the source document backing part of an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReference {
    /// 1-indexed page number
    pub page: u32,
    /// Excerpt text the answer is grounded on
    pub text: String,
}

/// One message in a document conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub references: Vec<DocumentReference>,
}

impl ChatMessage {
    /// Build a user message with no references
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            references: Vec::new(),
        }
    }

    /// Build an assistant message
    pub fn assistant(content: impl Into<String>, references: Vec<DocumentReference>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            references,
        }
    }
}
