//! Document record store trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::Document;

/// Trait for the document record store.
///
/// Each mutation is an atomic patch on a single record: no torn state is
/// observable within one call.
#[async_trait]
pub trait DocumentRecordStore: Send + Sync {
    /// Fetch a document by id
    async fn get(&self, id: &Uuid) -> Result<Option<Document>>;

    /// Insert a new document record
    async fn insert(&self, document: Document) -> Result<()>;

    /// List all document records
    async fn list(&self) -> Result<Vec<Document>>;

    /// Record the stored file location once the upload lands
    async fn set_file_location(&self, id: &Uuid, location: &str) -> Result<()>;

    /// Persist extracted content onto the record, bumping `updated_at`
    async fn set_content(&self, id: &Uuid, content: &str) -> Result<()>;

    /// Persist the flattened embedding and mark the record `Completed`
    /// in one patch
    async fn complete(&self, id: &Uuid, embedding: &[f32]) -> Result<()>;

    /// Mark the record `Failed`, recording the reason
    async fn mark_failed(&self, id: &Uuid, reason: &str) -> Result<()>;

    /// Delete a record outright (the classifier's destructive exit)
    async fn delete(&self, id: &Uuid) -> Result<()>;
}
