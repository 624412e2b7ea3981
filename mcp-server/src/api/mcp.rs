//! MCP Streamable HTTP endpoint handler.
//!
//! Every method on the MCP path is handed as-is to the session manager,
//! which owns all protocol logic.

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use tracing::error;

use crate::mcp::McpSessionManager;

/// `POST`/`GET`/`DELETE` on the MCP path.
pub async fn mcp_endpoint(
    Extension(sessions): Extension<McpSessionManager>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match sessions.handle_connection(&method, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            error!("MCP: Failed to handle {} request: {}", method, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
