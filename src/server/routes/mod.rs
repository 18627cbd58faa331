//! API routes

pub mod chat;
pub mod documents;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::state::AppState;

/// Build the API router
pub fn router(state: AppState) -> Router {
    let max_upload = state.config().server.max_upload_size;
    let enable_cors = state.config().server.enable_cors;

    let mut router = Router::new()
        .route("/health", get(health))
        .route(
            "/api/documents",
            post(documents::upload_document).get(documents::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/api/documents/:id/classify", post(documents::classify_document))
        .route("/api/documents/:id/chat", post(chat::chat_with_document))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
