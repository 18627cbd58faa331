//! Generative-text provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for single-turn prompt completion.
///
/// One rendered prompt in, freeform text out. No streaming, no retries;
/// retry policy belongs to the caller's scheduler.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt and return the raw response text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
