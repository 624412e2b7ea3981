//! API handlers.

pub mod mcp;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use vita_types::SERVICE_NAME;

/// Liveness check, independent of session state and worker reachability.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// Any path outside the health check and the MCP endpoint.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
