//! Document chat endpoint

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Prior conversation, oldest first; the server stores no history
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// POST /api/documents/:id/chat
pub async fn chat_with_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatMessage>> {
    let reply = state
        .chat()
        .chat(id, &request.message, &request.history)
        .await?;
    Ok(Json(reply))
}
