//! Chat engine: similarity scoring and grounded answer generation

use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::LexConfig;
use crate::error::{Error, Result};
use crate::providers::{DocumentRecordStore, EmbeddingProvider, LlmProvider, PromptTemplateProvider};
use crate::types::{ChatMessage, DocumentReference};

use super::prompt::{clean_response_wrapper, render_chat_prompt};

/// Dot product of two equal-length vectors.
///
/// Mismatched lengths are a `DimensionMismatch` error, never silently
/// truncated.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            query: a.len(),
            document: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Score a query vector against the stored flattened document vector.
///
/// The stored vector is the concatenation of per-chunk embeddings, so its
/// length is a multiple of the query dimension for any well-formed record;
/// the score is the best per-chunk dot product. A length that is not an
/// exact multiple is a `DimensionMismatch`.
pub fn score_against_document(query: &[f32], stored: &[f32]) -> Result<f32> {
    if query.is_empty() || stored.len() % query.len() != 0 {
        return Err(Error::DimensionMismatch {
            query: query.len(),
            document: stored.len(),
        });
    }

    stored
        .chunks_exact(query.len())
        .map(|chunk| dot_product(query, chunk))
        .try_fold(f32::MIN, |best, score| Ok(best.max(score?)))
}

/// The shape the generative service is asked to reply with. Strict: any
/// deviation is an `InvalidModelResponse`, never coerced into a best guess.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelReply {
    content: String,
    #[serde(default)]
    references: Vec<ModelReference>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelReference {
    page: u32,
    text: String,
}

/// Produces one grounded assistant message per invocation. Stateless across
/// calls; conversation history is caller-supplied.
pub struct ChatEngine {
    records: Arc<dyn DocumentRecordStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    prompts: Arc<dyn PromptTemplateProvider>,
    call_timeout: Duration,
}

impl ChatEngine {
    pub fn new(
        records: Arc<dyn DocumentRecordStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        prompts: Arc<dyn PromptTemplateProvider>,
        config: &LexConfig,
    ) -> Self {
        Self {
            records,
            embedder,
            llm,
            prompts,
            call_timeout: Duration::from_secs(config.processing.call_timeout_secs),
        }
    }

    /// Answer one user message against a document.
    ///
    /// The document must carry a non-empty stored embedding; otherwise the
    /// call fails with `DocumentNotReady` before any external call is made.
    pub async fn chat(
        &self,
        document_id: Uuid,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ChatMessage> {
        let document = self
            .records
            .get(&document_id)
            .await?
            .ok_or(Error::DocumentNotReady(document_id))?;

        let stored = document
            .vector_embedding
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(Error::DocumentNotReady(document_id))?;

        let query_vector = self
            .bounded("query embedding", self.embedder.embed(message))
            .await?;

        let similarity = score_against_document(&query_vector, stored)?;
        tracing::info!(
            document_id = %document_id,
            similarity,
            "Scored chat query against document vector"
        );

        let template = self.prompts.chat_template().await?;
        let prompt = render_chat_prompt(&template, &document.content, history, message);

        let raw = self.bounded("generation", self.llm.generate(&prompt)).await?;
        let cleaned = clean_response_wrapper(&raw);

        let reply: ModelReply = serde_json::from_str(&cleaned).map_err(|e| {
            Error::InvalidModelResponse {
                reason: e.to_string(),
                raw: raw.clone(),
            }
        })?;

        let references = reply
            .references
            .into_iter()
            .map(|r| DocumentReference {
                page: r.page,
                text: r.text,
            })
            .collect();

        Ok(ChatMessage::assistant(reply.content, references))
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let seconds = self.call_timeout.as_secs();
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout { operation, seconds }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product_is_symmetric() {
        let a = [1.0_f32, 2.0, 3.0];
        let b = [0.5_f32, -1.0, 2.0];
        assert_eq!(dot_product(&a, &b).unwrap(), dot_product(&b, &a).unwrap());
    }

    #[test]
    fn test_equal_vector_similarity_is_sum_of_squares() {
        let a = [1.5_f32, -2.0, 0.5];
        let expected: f32 = a.iter().map(|x| x * x).sum();
        assert_eq!(dot_product(&a, &a).unwrap(), expected);
    }

    #[test]
    fn test_dot_product_rejects_mismatched_lengths() {
        let err = dot_product(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        match err {
            Error::DimensionMismatch { query, document } => {
                assert_eq!(query, 2);
                assert_eq!(document, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_document_score_takes_best_chunk() {
        let query = [1.0_f32, 0.0];
        // Two chunk vectors flattened: [0,1] scores 0.0, [1,0] scores 1.0
        let stored = [0.0_f32, 1.0, 1.0, 0.0];
        assert_eq!(score_against_document(&query, &stored).unwrap(), 1.0);
    }

    #[test]
    fn test_document_score_rejects_non_multiple_length() {
        let err = score_against_document(&[1.0, 0.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_strict_reply_schema() {
        let ok: std::result::Result<ModelReply, _> =
            serde_json::from_str(r#"{"content": "x", "references": [{"page": 2, "text": "y"}]}"#);
        let reply = ok.unwrap();
        assert_eq!(reply.content, "x");
        assert_eq!(reply.references[0].page, 2);

        // references optional
        assert!(serde_json::from_str::<ModelReply>(r#"{"content": "x"}"#).is_ok());

        // unknown fields and missing content are deviations
        assert!(serde_json::from_str::<ModelReply>(r#"{"content": "x", "mood": "sure"}"#).is_err());
        assert!(serde_json::from_str::<ModelReply>(r#"{"references": []}"#).is_err());
    }
}
