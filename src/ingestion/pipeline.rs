//! The ingestion pipeline controller
//!
//! Drives one end-to-end run per document: fetch the uploaded file into a
//! scratch area, extract text, chunk it, persist the content, embed a
//! bounded prefix of the chunks, classify, and finalize the record status.
//! Owns the status transitions and the destructive exit taken on a negative
//! classifier verdict.

use dashmap::DashSet;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::classification::LegalClassifier;
use crate::config::{ChunkingConfig, LexConfig};
use crate::error::{Error, Result};
use crate::providers::{DocumentRecordStore, EmbeddingProvider, FileStore};
use crate::types::{Document, DocumentStatus};

use super::chunker::{assemble_content, TextChunker};
use super::extractor::TextExtractor;

/// Terminal outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionOutcome {
    /// The document reached `Completed` with a stored embedding
    Completed {
        chunk_count: usize,
        embedded_chunks: usize,
    },
    /// A negative classifier verdict deleted the document outright
    Deleted,
    /// The run was a no-op (already terminal, or a concurrent run holds
    /// the claim)
    Skipped(String),
}

/// Result payload of one pipeline run
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub document_id: Uuid,
    pub outcome: IngestionOutcome,
    /// Non-fatal classifier failure, surfaced for observability
    pub classifier_error: Option<String>,
}

/// Result of the standalone classify surface
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassifyOutcome {
    pub is_legal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates ingestion runs over the injected collaborators
pub struct IngestionPipeline {
    records: Arc<dyn DocumentRecordStore>,
    files: Arc<dyn FileStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    classifier: LegalClassifier,
    chunking: ChunkingConfig,
    max_chunks: usize,
    call_timeout: Duration,
    in_flight: Arc<DashSet<Uuid>>,
}

/// Releases the per-document claim on every exit path
struct ClaimGuard {
    set: Arc<DashSet<Uuid>>,
    id: Uuid,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}

impl IngestionPipeline {
    pub fn new(
        records: Arc<dyn DocumentRecordStore>,
        files: Arc<dyn FileStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        classifier: LegalClassifier,
        config: &LexConfig,
    ) -> Self {
        Self {
            records,
            files,
            embedder,
            classifier,
            chunking: config.chunking.clone(),
            max_chunks: config.embeddings.max_chunks,
            call_timeout: Duration::from_secs(config.processing.call_timeout_secs),
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Run the full ingestion pipeline for one document.
    ///
    /// Any fatal error forces a best-effort `Failed` status write before it
    /// is re-raised to the scheduler. A repeat trigger on an already
    /// terminal document, or a trigger racing an in-flight run, returns a
    /// `Skipped` report.
    pub async fn run(&self, document_id: Uuid) -> Result<IngestionReport> {
        let _claim = match self.claim(document_id) {
            Some(guard) => guard,
            None => {
                tracing::warn!(document_id = %document_id, "Ingestion already in flight, skipping");
                return Ok(IngestionReport {
                    document_id,
                    outcome: IngestionOutcome::Skipped("run already in flight".to_string()),
                    classifier_error: None,
                });
            }
        };

        let document = self
            .records
            .get(&document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;

        if document.status != DocumentStatus::Processing {
            tracing::info!(
                document_id = %document_id,
                status = ?document.status,
                "Document already terminal, skipping"
            );
            return Ok(IngestionReport {
                document_id,
                outcome: IngestionOutcome::Skipped(format!(
                    "document is {:?}, not processing",
                    document.status
                )),
                classifier_error: None,
            });
        }

        match self.execute(&document).await {
            Ok(report) => Ok(report),
            Err(err) => {
                // Secondary failures while writing the terminal status are
                // logged, never retried.
                if let Err(write_err) = self
                    .records
                    .mark_failed(&document_id, &err.to_string())
                    .await
                {
                    tracing::error!(
                        document_id = %document_id,
                        "Failed to record failed status: {}",
                        write_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn execute(&self, document: &Document) -> Result<IngestionReport> {
        let location = document
            .file_location
            .clone()
            .filter(|l| !l.is_empty())
            .ok_or(Error::MissingFileLocation(document.id))?;

        tracing::info!(
            document_id = %document.id,
            media_type = %document.media_type,
            "Starting ingestion"
        );

        // Stage the file in a scratch area. The temp file is removed on
        // drop, so cleanup holds on every exit path.
        let bytes = self.bounded("file fetch", self.files.fetch(&location)).await?;
        let mut scratch = tempfile::NamedTempFile::new()?;
        scratch.write_all(&bytes)?;
        scratch.flush()?;

        let media_type = document.media_type.clone();
        let scratch_path = scratch.path().to_path_buf();
        let segments =
            tokio::task::spawn_blocking(move || TextExtractor::extract(&scratch_path, &media_type))
                .await
                .map_err(|e| Error::Internal(format!("extraction task failed: {}", e)))??;

        let chunker = TextChunker::from_config(&self.chunking);
        let chunks = chunker.chunk_segments(&segments);
        if chunks.is_empty() {
            return Err(Error::EmptyContent);
        }

        // Content is durable before embedding begins: a later failure still
        // leaves usable text on the record.
        let content = assemble_content(&chunks);
        self.records.set_content(&document.id, &content).await?;
        tracing::info!(
            document_id = %document.id,
            chunks = chunks.len(),
            content_len = content.len(),
            "Content persisted, generating embeddings"
        );

        let texts: Vec<String> = chunks
            .iter()
            .take(self.max_chunks)
            .map(|c| c.text.clone())
            .collect();
        let vectors = self
            .bounded("embedding", self.embedder.embed_batch(&texts))
            .await?;
        let vector: Vec<f32> = vectors.into_iter().flatten().collect();

        let mut classifier_error = None;
        match self
            .bounded("classification", self.classifier.classify(&content))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    document_id = %document.id,
                    "Negative classifier verdict, deleting document"
                );
                self.records.delete(&document.id).await?;
                if let Err(e) = self.files.delete(&location).await {
                    tracing::warn!(
                        document_id = %document.id,
                        "Failed to delete backing file {}: {}",
                        location,
                        e
                    );
                }
                return Ok(IngestionReport {
                    document_id: document.id,
                    outcome: IngestionOutcome::Deleted,
                    classifier_error: None,
                });
            }
            Err(e) => {
                // No verdict is never a negative verdict: keep the document
                // and surface the failure in the report.
                tracing::warn!(
                    document_id = %document.id,
                    "Classifier unavailable, keeping document: {}",
                    e
                );
                classifier_error = Some(e.to_string());
            }
        }

        self.records.complete(&document.id, &vector).await?;
        tracing::info!(
            document_id = %document.id,
            embedded_chunks = texts.len(),
            vector_len = vector.len(),
            "Ingestion completed"
        );

        Ok(IngestionReport {
            document_id: document.id,
            outcome: IngestionOutcome::Completed {
                chunk_count: chunks.len(),
                embedded_chunks: texts.len(),
            },
            classifier_error,
        })
    }

    /// Standalone classification of a document's persisted content.
    ///
    /// Upstream failure is reported alongside a keep verdict, never as a
    /// negative one.
    pub async fn classify_document(&self, document_id: Uuid) -> Result<ClassifyOutcome> {
        let document = self
            .records
            .get(&document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;

        if document.content.is_empty() {
            return Err(Error::EmptyContent);
        }

        match self
            .bounded("classification", self.classifier.classify(&document.content))
            .await
        {
            Ok(is_legal) => Ok(ClassifyOutcome { is_legal, error: None }),
            Err(e) => Ok(ClassifyOutcome {
                is_legal: true,
                error: Some(e.to_string()),
            }),
        }
    }

    fn claim(&self, id: Uuid) -> Option<ClaimGuard> {
        if self.in_flight.insert(id) {
            Some(ClaimGuard {
                set: Arc::clone(&self.in_flight),
                id,
            })
        } else {
            None
        }
    }

    /// Bound an external call; expiry maps to that step's failure path
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
