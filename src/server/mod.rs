//! HTTP server wiring

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::LexConfig;
use crate::error::{Error, Result};
use crate::processing::IngestionWorker;

pub use state::AppState;

/// The lex-rag HTTP server
pub struct LexServer {
    state: AppState,
    ingest_rx: mpsc::Receiver<Uuid>,
    address: SocketAddr,
}

impl LexServer {
    /// Build the server and its application state
    pub fn new(config: LexConfig) -> Result<Self> {
        let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid server address: {}", e)))?;

        let (state, ingest_rx) = AppState::new(config)?;

        Ok(Self {
            state,
            ingest_rx,
            address,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Start the background worker and serve requests until shutdown
    pub async fn start(self) -> Result<()> {
        let worker = IngestionWorker::new(self.state.pipeline(), self.state.config());
        tokio::spawn(worker.run(self.ingest_rx));

        let app = routes::router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(self.address).await?;
        tracing::info!("Listening on {}", self.address);

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Internal(format!("server error: {}", e)))?;

        Ok(())
    }
}
