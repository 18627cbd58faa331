//! Prompt template provider

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Trait for the external prompt-configuration collaborator.
///
/// Templates carry the placeholders `{{DOCUMENT_CONTENT}}`,
/// `{{CONVERSATION_HISTORY}}`, `{{USER_MESSAGE}}` and
/// `{{FRESH_CONVERSATION_INSTRUCTION}}`.
#[async_trait]
pub trait PromptTemplateProvider: Send + Sync {
    /// Fetch the chat prompt template
    async fn chat_template(&self) -> Result<String>;
}

/// Built-in chat template, used when no template file is configured.
pub const DEFAULT_CHAT_TEMPLATE: &str = r#"You are a legal assistant answering questions about one specific document. Ground every statement in the document text below; never invent content that is not in the document.

DOCUMENT:
{{DOCUMENT_CONTENT}}

CONVERSATION SO FAR:
{{CONVERSATION_HISTORY}}
{{FRESH_CONVERSATION_INSTRUCTION}}

USER QUESTION:
{{USER_MESSAGE}}

Respond with a single JSON object and nothing else, in this exact shape:
{"content": "<your answer>", "references": [{"page": <page number>, "text": "<short excerpt from the document that supports the answer>"}]}

Use an empty "references" array when no specific passage applies."#;

/// File-backed template provider with a built-in fallback
pub struct FilePromptStore {
    chat_template_path: Option<PathBuf>,
}

impl FilePromptStore {
    pub fn new(chat_template_path: Option<PathBuf>) -> Self {
        Self { chat_template_path }
    }
}

#[async_trait]
impl PromptTemplateProvider for FilePromptStore {
    async fn chat_template(&self) -> Result<String> {
        match &self.chat_template_path {
            Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::Config(format!("cannot read prompt template {}: {}", path.display(), e))
            }),
            None => Ok(DEFAULT_CHAT_TEMPLATE.to_string()),
        }
    }
}
