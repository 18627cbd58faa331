//! File object store trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Trait for raw file storage
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store file bytes for a document.
    ///
    /// Returns the storage location the bytes can later be fetched by.
    async fn store(&self, document_id: &Uuid, filename: &str, data: &[u8]) -> Result<String>;

    /// Fetch file bytes by storage location
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;

    /// Delete a stored file by location
    async fn delete(&self, location: &str) -> Result<()>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
