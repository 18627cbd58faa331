//! Configuration for the lex-rag service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Legal-document classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,
    /// Prompt template configuration
    #[serde(default)]
    pub prompts: PromptConfig,
}

impl LexConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 6000,
            overlap: 200,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Maximum number of chunks embedded per document. Truncation drops
    /// trailing chunks, never a sample.
    pub max_chunks: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { max_chunks: 10 }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Number of leading characters of extracted content sent to the
    /// classifier (token-budget ceiling for the upstream call)
    pub excerpt_limit: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            excerpt_limit: 20_000,
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Bounded timeout applied to each external call within a pipeline run
    /// or chat invocation, in seconds
    pub call_timeout_secs: u64,
    /// Number of documents processed concurrently (default: CPU count, max 8)
    pub parallel_documents: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 120,
            parallel_documents: None, // Auto-detect from CPU count
        }
    }
}

/// Storage paths for the local record and file stores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base data directory
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the uploaded-files directory
    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }

    /// Path of the document registry file
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("documents.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("lex-rag");
        Self { data_dir }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Path to the chat prompt template file. When unset, the built-in
    /// template is used.
    pub chat_template_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_contract() {
        let config = LexConfig::default();
        assert_eq!(config.chunking.max_chunk_size, 6000);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.embeddings.max_chunks, 10);
        assert_eq!(config.classifier.excerpt_limit, 20_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: LexConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            enable_cors = false
            max_upload_size = 1048576
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.chunking.max_chunk_size, 6000);
    }
}
