use axum::response::{IntoResponse, Json};
use serde_json::json;

/// Answers `{"api": "up"}` without touching the store.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "api": "up" }))
}
