//! Shared test fixtures: fake providers and a pipeline/engine builder
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lex_rag::chat::ChatEngine;
use lex_rag::classification::LegalClassifier;
use lex_rag::config::{LexConfig, StorageConfig};
use lex_rag::error::{Error, Result};
use lex_rag::ingestion::IngestionPipeline;
use lex_rag::providers::{
    DocumentRecordStore, EmbeddingProvider, FilePromptStore, FileStore, JsonRecordStore,
    LlmProvider, LocalFileStore,
};

/// Dimension of the fake embedding space
pub const DIM: usize = 4;

/// Deterministic embedder: the vector is a function of the input text
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::EmbeddingService("fake embedder down".to_string()));
        }
        Ok(vec![text.len() as f32, 1.0, 2.0, 3.0])
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Canned LLM: replays a fixed response (or failure) and records prompts
pub struct FakeLlm {
    response: std::result::Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.response.clone().map_err(Error::Generation)
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// A full harness over real local stores in a temp directory
pub struct Harness {
    pub config: LexConfig,
    pub records: Arc<dyn DocumentRecordStore>,
    pub files: Arc<dyn FileStore>,
    pub embedder: Arc<FakeEmbedder>,
    pub llm: Arc<FakeLlm>,
    // Held for its Drop: removes the temp data dir
    _data_dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(embedder: FakeEmbedder, llm: FakeLlm) -> Self {
        let data_dir = tempfile::tempdir().expect("temp dir");
        let config = LexConfig {
            storage: StorageConfig {
                data_dir: data_dir.path().to_path_buf(),
            },
            ..LexConfig::default()
        };

        let records: Arc<dyn DocumentRecordStore> = Arc::new(
            JsonRecordStore::open(config.storage.records_path()).expect("record store"),
        );
        let files: Arc<dyn FileStore> =
            Arc::new(LocalFileStore::new(config.storage.files_dir()).expect("file store"));

        Self {
            config,
            records,
            files,
            embedder: Arc::new(embedder),
            llm: Arc::new(llm),
            _data_dir: data_dir,
        }
    }

    pub fn pipeline(&self) -> IngestionPipeline {
        let classifier = LegalClassifier::new(
            self.llm.clone() as Arc<dyn LlmProvider>,
            self.config.classifier.excerpt_limit,
        );
        IngestionPipeline::new(
            Arc::clone(&self.records),
            Arc::clone(&self.files),
            self.embedder.clone() as Arc<dyn EmbeddingProvider>,
            classifier,
            &self.config,
        )
    }

    pub fn chat_engine(&self) -> ChatEngine {
        ChatEngine::new(
            Arc::clone(&self.records),
            self.embedder.clone() as Arc<dyn EmbeddingProvider>,
            self.llm.clone() as Arc<dyn LlmProvider>,
            Arc::new(FilePromptStore::new(None)),
            &self.config,
        )
    }
}
