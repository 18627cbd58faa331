//! Legal-document classification
//!
//! Wraps the generative-text service to answer a yes/no "is this a legal
//! document" question about extracted content. The verdict policy defaults
//! to keep: only an explicit leading "no" is a negative verdict, and an
//! upstream failure is an error, never a verdict.

use regex::Regex;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::LlmProvider;

/// Classifier over an injected generative-text provider
pub struct LegalClassifier {
    llm: Arc<dyn LlmProvider>,
    excerpt_limit: usize,
}

impl LegalClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>, excerpt_limit: usize) -> Self {
        Self { llm, excerpt_limit }
    }

    /// Classify extracted content.
    ///
    /// Returns `Ok(false)` only on an explicit negative verdict;
    /// ambiguous or empty responses count as positive.
    pub async fn classify(&self, content: &str) -> Result<bool> {
        let excerpt = leading_chars(content, self.excerpt_limit);
        let prompt = format!(
            "You are reviewing the beginning of an uploaded document. \
             Answer with a single word, yes or no: is this a legal document \
             (for example a contract, agreement, statute, filing, or legal notice)?\n\n\
             DOCUMENT EXCERPT:\n{}",
            excerpt
        );

        let response = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| Error::ClassifierService(e.to_string()))?;

        let negative = verdict_is_negative(&response);
        tracing::debug!(negative, "classifier verdict: {:?}", response.trim());
        Ok(!negative)
    }
}

/// Match a negative verdict: a case-insensitive `no` at the start of the
/// response. Anchoring keeps an affirmative sentence that merely contains
/// "no" from reading as a deletion verdict.
fn verdict_is_negative(response: &str) -> bool {
    let pattern = Regex::new(r"(?i)^\W*no\b").expect("valid verdict pattern");
    pattern.is_match(response)
}

/// First `limit` characters of `text`, on a character boundary
fn leading_chars(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
