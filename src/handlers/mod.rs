pub mod books;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

/// GET / - Service info
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Bookshelf API",
        "version": version,
        "description": "Personal book-tracking API with per-user ownership",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "books": "/books, /books/:id (session required)",
        }
    }))
}

/// GET /health - Liveness plus store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("store health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}

/// Fallback for unknown routes
pub async fn fallback() -> ApiError {
    ApiError::not_found("No such endpoint")
}
