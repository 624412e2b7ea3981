//! VITA health MCP server library.
//!
//! Exposes the VITA worker API to AI assistants as MCP tools and a dashboard
//! widget over Streamable HTTP. This module exposes the application builder
//! for use in tests.

use axum::http::{header, HeaderName, Method};
use axum::{
    routing::{any, get},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;
pub mod config;
pub mod mcp;
pub mod tools;
pub mod widgets;

use client::{HealthBackend, WorkerClient, WorkerError};
use config::Config;
use mcp::{McpSessionManager, MCP_SESSION_ID_HEADER};

/// Create the Axum application router backed by the configured worker.
pub fn create_app(config: &Config) -> Result<Router, WorkerError> {
    let backend: Arc<dyn HealthBackend> = Arc::new(WorkerClient::new(&config.worker_url)?);
    Ok(create_app_with_sessions(
        config,
        McpSessionManager::new(backend),
    ))
}

/// Create the Axum application router around an existing session manager.
///
/// Tests use this to inject a stub backend and to inspect the session table.
pub fn create_app_with_sessions(config: &Config, sessions: McpSessionManager) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(&config.mcp_path, any(api::mcp::mcp_endpoint))
        .layer(Extension(sessions))
        .fallback(api::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(MCP_SESSION_ID_HEADER),
                    HeaderName::from_static("mcp-protocol-version"),
                ])
                .expose_headers([HeaderName::from_static(MCP_SESSION_ID_HEADER)]),
        )
        .layer(TraceLayer::new_for_http())
}
