//! Document upload and registry endpoints

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::ClassifyOutcome;
use crate::providers::{DocumentRecordStore, FileStore};
use crate::server::state::AppState;
use crate::types::{Document, DocumentStatus};

/// Registry view of a document; the stored embedding itself is never
/// returned over the API.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    pub content_length: usize,
    pub has_embedding: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            media_type: doc.media_type.clone(),
            size_bytes: doc.size_bytes,
            status: doc.status,
            content_length: doc.content.len(),
            has_embedding: doc.is_chat_ready(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub document_id: Uuid,
    pub status: DocumentStatus,
}

/// POST /api/documents - upload a document and trigger ingestion
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut title: Option<String> = None;
    let mut owner_id: Option<Uuid> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    Error::InvalidRequest(format!("failed to read title: {}", e))
                })?);
            }
            "owner_id" => {
                let raw = field.text().await.map_err(|e| {
                    Error::InvalidRequest(format!("failed to read owner_id: {}", e))
                })?;
                owner_id = Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| Error::InvalidRequest(format!("invalid owner_id: {}", raw)))?,
                );
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "upload.bin".to_string());
                let declared = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    Error::InvalidRequest(format!("failed to read file: {}", e))
                })?;

                let media_type = declared
                    .filter(|t| t != "application/octet-stream")
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&filename)
                            .first_or_octet_stream()
                            .to_string()
                    });

                file = Some((filename, media_type, data.to_vec()));
            }
            other => {
                tracing::debug!("ignoring unexpected multipart field {:?}", other);
            }
        }
    }

    let (filename, media_type, data) =
        file.ok_or_else(|| Error::InvalidRequest("missing file field".to_string()))?;

    tracing::info!(
        "Upload: {} ({}, {} bytes)",
        filename,
        media_type,
        data.len()
    );

    // The record exists in processing state before the file does
    // (upload-intent time), matching the pipeline's entry precondition.
    let document = Document::new(
        title.unwrap_or_else(|| filename.clone()),
        owner_id.unwrap_or_else(Uuid::nil),
        media_type,
        data.len() as u64,
    );
    let document_id = document.id;
    state.records().insert(document).await?;

    let location = state.files().store(&document_id, &filename, &data).await?;
    state
        .records()
        .set_file_location(&document_id, &location)
        .await?;

    state.enqueue_ingestion(document_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            document_id,
            status: DocumentStatus::Processing,
        }),
    ))
}

/// GET /api/documents - list registry entries
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentSummary>>> {
    let documents = state.records().list().await?;
    Ok(Json(documents.iter().map(DocumentSummary::from).collect()))
}

/// GET /api/documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentSummary>> {
    let document = state
        .records()
        .get(&id)
        .await?
        .ok_or(Error::DocumentNotFound(id))?;
    Ok(Json(DocumentSummary::from(&document)))
}

/// DELETE /api/documents/:id - remove the record and its backing file
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let document = state
        .records()
        .get(&id)
        .await?
        .ok_or(Error::DocumentNotFound(id))?;

    state.records().delete(&id).await?;

    if let Some(location) = &document.file_location {
        if let Err(e) = state.files().delete(location).await {
            tracing::warn!("Failed to delete backing file {}: {}", location, e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/documents/:id/classify - standalone classification surface
pub async fn classify_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassifyOutcome>> {
    let outcome = state.pipeline().classify_document(id).await?;
    Ok(Json(outcome))
}
