//! Local backend: JSON-file document registry and filesystem file store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Document, DocumentStatus};

use super::file_store::FileStore;
use super::record_store::DocumentRecordStore;

/// Document record store backed by an in-process map, persisted as JSON.
///
/// Every mutation locks a single record entry, so each patch is atomic with
/// respect to concurrent readers of that record.
pub struct JsonRecordStore {
    documents: DashMap<Uuid, Document>,
    path: PathBuf,
    save_lock: Mutex<()>,
}

impl JsonRecordStore {
    /// Open the registry, loading any previously persisted records
    pub fn open(path: PathBuf) -> Result<Self> {
        let documents = DashMap::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Vec<Document>>(&raw) {
                Ok(docs) => {
                    let count = docs.len();
                    for doc in docs {
                        documents.insert(doc.id, doc);
                    }
                    tracing::info!("Loaded {} document records from {}", count, path.display());
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable document registry {}: {}", path.display(), e);
                }
            }
        } else if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self {
            documents,
            path,
            save_lock: Mutex::new(()),
        })
    }

    /// Persist the registry. Best-effort: a write failure is logged, the
    /// in-memory state stays authoritative.
    fn save(&self) {
        let _guard = self.save_lock.lock();
        let docs: Vec<Document> = self.documents.iter().map(|e| e.value().clone()).collect();
        match serde_json::to_vec_pretty(&docs) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&self.path, bytes) {
                    tracing::warn!("Failed to persist document registry: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize document registry: {}", e),
        }
    }

    fn patch<F>(&self, id: &Uuid, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Document),
    {
        match self.documents.get_mut(id) {
            Some(mut entry) => {
                apply(entry.value_mut());
                entry.value_mut().updated_at = Utc::now();
                drop(entry);
                self.save();
                Ok(())
            }
            None => Err(Error::DocumentNotFound(*id)),
        }
    }
}

#[async_trait]
impl DocumentRecordStore for JsonRecordStore {
    async fn get(&self, id: &Uuid) -> Result<Option<Document>> {
        Ok(self.documents.get(id).map(|e| e.value().clone()))
    }

    async fn insert(&self, document: Document) -> Result<()> {
        self.documents.insert(document.id, document);
        self.save();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self.documents.iter().map(|e| e.value().clone()).collect();
        docs.sort_by_key(|d| d.created_at);
        Ok(docs)
    }

    async fn set_file_location(&self, id: &Uuid, location: &str) -> Result<()> {
        self.patch(id, |doc| {
            doc.file_location = Some(location.to_string());
        })
    }

    async fn set_content(&self, id: &Uuid, content: &str) -> Result<()> {
        self.patch(id, |doc| {
            doc.content = content.to_string();
        })
    }

    async fn complete(&self, id: &Uuid, embedding: &[f32]) -> Result<()> {
        self.patch(id, |doc| {
            doc.vector_embedding = Some(embedding.to_vec());
            doc.status = DocumentStatus::Completed;
        })
    }

    async fn mark_failed(&self, id: &Uuid, reason: &str) -> Result<()> {
        tracing::warn!(document_id = %id, "Marking document failed: {}", reason);
        self.patch(id, |doc| {
            doc.status = DocumentStatus::Failed;
        })
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.documents.remove(id);
        self.save();
        Ok(())
    }
}

/// File store backed by a local directory
pub struct LocalFileStore {
    base_dir: PathBuf,
}

impl LocalFileStore {
    /// Create the store, ensuring the base directory exists
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn resolve(&self, location: &str) -> PathBuf {
        self.base_dir.join(location)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, document_id: &Uuid, filename: &str, data: &[u8]) -> Result<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let location = format!("{}.{}", document_id, extension);

        tokio::fs::write(self.resolve(&location), data)
            .await
            .map_err(|e| Error::FileStore(format!("failed to store {}: {}", location, e)))?;

        Ok(location)
    }

    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        tokio::fs::read(self.resolve(location))
            .await
            .map_err(|e| Error::FileStore(format!("failed to fetch {}: {}", location, e)))
    }

    async fn delete(&self, location: &str) -> Result<()> {
        match tokio::fs::remove_file(self.resolve(location)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::FileStore(format!("failed to delete {}: {}", location, e))),
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}
