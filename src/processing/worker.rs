//! Background worker driving ingestion runs
//!
//! The worker is the in-process scheduler: it receives document ids from an
//! mpsc channel and runs the pipeline for each, bounded by a semaphore so
//! runs on different documents proceed concurrently while each document is
//! processed by exactly one task.

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use crate::config::LexConfig;
use crate::ingestion::{IngestionOutcome, IngestionPipeline};

/// Worker for processing ingestion triggers in the background
pub struct IngestionWorker {
    pipeline: Arc<IngestionPipeline>,
    parallel_documents: usize,
}

impl IngestionWorker {
    /// Create a new worker
    pub fn new(pipeline: Arc<IngestionPipeline>, config: &LexConfig) -> Self {
        let parallel_documents = config
            .processing
            .parallel_documents
            .unwrap_or_else(|| num_cpus::get().min(8));

        Self {
            pipeline,
            parallel_documents,
        }
    }

    /// Process triggers until the channel closes
    pub async fn run(self, mut receiver: mpsc::Receiver<Uuid>) {
        tracing::info!(
            "Ingestion worker started: {} parallel documents",
            self.parallel_documents
        );

        let semaphore = Arc::new(Semaphore::new(self.parallel_documents));

        while let Some(document_id) = receiver.recv().await {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let pipeline = Arc::clone(&self.pipeline);

            tokio::spawn(async move {
                let _permit = permit;

                match pipeline.run(document_id).await {
                    Ok(report) => {
                        if let Some(err) = &report.classifier_error {
                            tracing::warn!(
                                document_id = %document_id,
                                "Run completed with classifier error: {}",
                                err
                            );
                        }
                        match report.outcome {
                            IngestionOutcome::Completed {
                                chunk_count,
                                embedded_chunks,
                            } => tracing::info!(
                                document_id = %document_id,
                                chunk_count,
                                embedded_chunks,
                                "Ingestion run completed"
                            ),
                            IngestionOutcome::Deleted => tracing::info!(
                                document_id = %document_id,
                                "Document deleted by classifier verdict"
                            ),
                            IngestionOutcome::Skipped(reason) => tracing::info!(
                                document_id = %document_id,
                                "Ingestion run skipped: {}",
                                reason
                            ),
                        }
                    }
                    Err(e) => tracing::error!(
                        document_id = %document_id,
                        "Ingestion run failed: {}",
                        e
                    ),
                }
            });
        }

        tracing::info!("Ingestion worker stopped: channel closed");
    }
}
