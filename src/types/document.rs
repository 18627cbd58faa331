//! Document record type and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a document record.
///
/// A record is created in `Processing` at upload-intent time, before the
/// file exists, and transitions to `Completed` or `Failed` exactly once per
/// pipeline run. A document judged non-legal by the classifier is deleted
/// outright and never reaches a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

/// An uploaded legal document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Extracted text content, empty until the pipeline persists it
    #[serde(default)]
    pub content: String,
    /// Owning user
    pub owner_id: Uuid,
    /// Declared media type of the uploaded file (e.g. "application/pdf")
    pub media_type: String,
    /// Uploaded file size in bytes
    pub size_bytes: u64,
    /// Location of the backing file in the file store, set once uploaded
    #[serde(default)]
    pub file_location: Option<String>,
    /// Lifecycle status
    pub status: DocumentStatus,
    /// Flattened concatenation of per-chunk embedding vectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_embedding: Option<Vec<f32>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document record in `Processing` state
    pub fn new(title: String, owner_id: Uuid, media_type: String, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content: String::new(),
            owner_id,
            media_type,
            size_bytes,
            file_location: None,
            status: DocumentStatus::Processing,
            vector_embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A document is eligible for chat once it carries a non-empty stored
    /// embedding, regardless of status label drift.
    pub fn is_chat_ready(&self) -> bool {
        self.vector_embedding
            .as_ref()
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }
}
