use axum::{http::header, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serves a pre-rendered OpenAPI document.
pub async fn openapi_json(doc: Arc<Value>) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json((*doc).clone()))
}
