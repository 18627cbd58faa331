//! Application state for the lex-rag server

use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::chat::ChatEngine;
use crate::classification::LegalClassifier;
use crate::config::LexConfig;
use crate::error::{Error, Result};
use crate::ingestion::IngestionPipeline;
use crate::providers::{
    ollama::OllamaProvider, DocumentRecordStore, EmbeddingProvider, FilePromptStore, FileStore,
    JsonRecordStore, LlmProvider, LocalFileStore, PromptTemplateProvider,
};

/// Shared application state.
///
/// All clients are constructed once per process here and handed to the
/// pipeline and chat engine as configuration; nothing lives in module-level
/// globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LexConfig,
    records: Arc<dyn DocumentRecordStore>,
    files: Arc<dyn FileStore>,
    pipeline: Arc<IngestionPipeline>,
    chat: Arc<ChatEngine>,
    ingest_tx: mpsc::Sender<Uuid>,
}

impl AppState {
    /// Build the state and the receiving end of the ingestion queue
    pub fn new(config: LexConfig) -> Result<(Self, mpsc::Receiver<Uuid>)> {
        tracing::info!("Initializing application state...");

        let records: Arc<dyn DocumentRecordStore> =
            Arc::new(JsonRecordStore::open(config.storage.records_path())?);
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(config.storage.files_dir())?);

        let (embedder, llm) = OllamaProvider::new(&config.llm).split();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
        let llm: Arc<dyn LlmProvider> = Arc::new(llm);
        tracing::info!(
            "Ollama providers initialized (embed: {}, generate: {})",
            config.llm.embed_model,
            config.llm.generate_model
        );

        let prompts: Arc<dyn PromptTemplateProvider> = Arc::new(FilePromptStore::new(
            config.prompts.chat_template_path.clone(),
        ));

        let classifier = LegalClassifier::new(Arc::clone(&llm), config.classifier.excerpt_limit);

        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::clone(&records),
            Arc::clone(&files),
            Arc::clone(&embedder),
            classifier,
            &config,
        ));

        let chat = Arc::new(ChatEngine::new(
            Arc::clone(&records),
            embedder,
            llm,
            prompts,
            &config,
        ));

        let (ingest_tx, ingest_rx) = mpsc::channel(256);

        let state = Self {
            inner: Arc::new(AppStateInner {
                config,
                records,
                files,
                pipeline,
                chat,
                ingest_tx,
            }),
        };

        Ok((state, ingest_rx))
    }

    pub fn config(&self) -> &LexConfig {
        &self.inner.config
    }

    pub fn records(&self) -> &Arc<dyn DocumentRecordStore> {
        &self.inner.records
    }

    pub fn files(&self) -> &Arc<dyn FileStore> {
        &self.inner.files
    }

    pub fn pipeline(&self) -> Arc<IngestionPipeline> {
        Arc::clone(&self.inner.pipeline)
    }

    pub fn chat(&self) -> &ChatEngine {
        &self.inner.chat
    }

    /// Hand a document id to the background ingestion worker
    pub async fn enqueue_ingestion(&self, document_id: Uuid) -> Result<()> {
        self.inner
            .ingest_tx
            .send(document_id)
            .await
            .map_err(|_| Error::Internal("ingestion worker is not running".to_string()))
    }
}
