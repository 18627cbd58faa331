//! lex-rag server binary
//!
//! Run with: cargo run --bin lex-rag-server

use lex_rag::{config::LexConfig, server::LexServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lex_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from LEX_RAG_CONFIG when set, defaults otherwise
    let config = match std::env::var_os("LEX_RAG_CONFIG") {
        Some(path) => LexConfig::from_file(std::path::Path::new(&path))?,
        None => LexConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Generation model: {}", config.llm.generate_model);
    tracing::info!("  - Chunk size: {}", config.chunking.max_chunk_size);
    tracing::info!("  - Data dir: {}", config.storage.data_dir.display());

    // Check Ollama availability up front; the server still starts without it
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.llm.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Ingestion and chat will fail until it is started:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!(
                "  2. Pull models: ollama pull {} && ollama pull {}",
                config.llm.embed_model,
                config.llm.generate_model
            );
        }
    }

    let server = LexServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST   /api/documents              - Upload a document");
    println!("  GET    /api/documents              - List documents");
    println!("  GET    /api/documents/:id          - Document status");
    println!("  DELETE /api/documents/:id          - Delete a document");
    println!("  POST   /api/documents/:id/classify - Re-run classification");
    println!("  POST   /api/documents/:id/chat     - Chat about a document");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
