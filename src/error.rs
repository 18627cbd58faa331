//! Error types for the ingestion pipeline and chat engine

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by the ingestion pipeline, chat engine, and their
/// collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Document record has no stored file to download
    #[error("document {0} has no file location")]
    MissingFileLocation(Uuid),

    /// Declared media type is not one we can extract text from
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Text extraction failed on a supported media type
    #[error("text extraction failed ({media_type}): {reason}")]
    Extraction { media_type: String, reason: String },

    /// Extraction produced no usable text
    #[error("no text content could be extracted")]
    EmptyContent,

    /// Embedding service call failed
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// Classifier upstream call failed. Non-fatal to the pipeline: the
    /// absence of a verdict is never treated as a negative verdict.
    #[error("classifier service error: {0}")]
    ClassifierService(String),

    /// Document exists but has no stored embedding to chat against
    #[error("document {0} is not ready for chat (no stored embedding)")]
    DocumentNotReady(Uuid),

    /// Query and document vectors have different lengths
    #[error("embedding dimension mismatch: query {query}, document {document}")]
    DimensionMismatch { query: usize, document: usize },

    /// Generative response did not parse into the expected shape.
    /// Carries the raw text for diagnostics.
    #[error("model response did not match the expected shape: {reason}")]
    InvalidModelResponse { reason: String, raw: String },

    /// Generative-text service call failed
    #[error("generation service error: {0}")]
    Generation(String),

    /// Document record does not exist
    #[error("document {0} not found")]
    DocumentNotFound(Uuid),

    /// Record store failure
    #[error("record store error: {0}")]
    RecordStore(String),

    /// File object store failure
    #[error("file store error: {0}")]
    FileStore(String),

    /// Malformed client request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// An external call exceeded its bounded timeout
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Catch-all for internal invariant failures
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an extraction error from any displayable cause
    pub fn extraction(media_type: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            media_type: media_type.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::DocumentNotReady(_) => StatusCode::CONFLICT,
            Self::MissingFileLocation(_) | Self::EmptyContent => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidModelResponse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EmbeddingService(_)
            | Self::ClassifierService(_)
            | Self::Generation(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
