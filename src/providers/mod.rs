//! Provider abstractions for the external collaborators
//!
//! The pipeline and chat engine only see these traits; concrete clients are
//! constructed once per process and passed in as configuration.

pub mod embedding;
pub mod file_store;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod prompt_store;
pub mod record_store;

pub use embedding::EmbeddingProvider;
pub use file_store::FileStore;
pub use llm::LlmProvider;
pub use local::{JsonRecordStore, LocalFileStore};
pub use prompt_store::{FilePromptStore, PromptTemplateProvider};
pub use record_store::DocumentRecordStore;
