//! Shared helpers for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use vita_mcp::client::{HealthBackend, WorkerError};
use vita_mcp::config::Config;
use vita_mcp::create_app_with_sessions;
use vita_mcp::mcp::{McpSessionManager, MCP_SESSION_ID_HEADER};

/// Backend stub replaying canned responses per path and counting calls.
#[derive(Default)]
pub struct StubBackend {
    responses: Mutex<HashMap<String, Result<Value, (u16, String)>>>,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses.lock().insert(path.to_string(), Ok(body));
    }

    pub fn fail(&self, path: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .insert(path.to_string(), Err((status, body.to_string())));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthBackend for StubBackend {
    async fn fetch(&self, path: &str, _params: &[(&str, String)]) -> Result<Value, WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().get(path).cloned() {
            Some(Ok(body)) => Ok(body),
            Some(Err((status, body))) => Err(WorkerError::Upstream { status, body }),
            None => Ok(json!({})),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub sessions: McpSessionManager,
    pub backend: Arc<StubBackend>,
}

/// Helper to create a test app instance around a stub backend.
pub fn create_test_app() -> TestApp {
    let backend = StubBackend::new();
    let sessions = McpSessionManager::new(backend.clone());
    let router = create_app_with_sessions(&Config::default(), sessions.clone());
    TestApp {
        router,
        sessions,
        backend,
    }
}

pub struct RpcReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RpcReply {
    pub fn session_id(&self) -> Option<String> {
        self.headers
            .get(MCP_SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// POST a JSON-RPC body to `/mcp`.
pub async fn post(app: &TestApp, session: Option<&str>, body: Value) -> RpcReply {
    let mut request = Request::builder()
        .uri("/mcp")
        .method("POST")
        .header("content-type", "application/json")
        .header("accept", "application/json, text/event-stream");
    if let Some(id) = session {
        request = request.header(MCP_SESSION_ID_HEADER, id);
    }
    let response = app
        .router
        .clone()
        .oneshot(
            request
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    RpcReply {
        status,
        headers,
        body,
    }
}

/// Send a request with an empty body and the given method to `/mcp`.
pub async fn send(app: &TestApp, method: &str, session: Option<&str>) -> StatusCode {
    let mut request = Request::builder().uri("/mcp").method(method);
    if let Some(id) = session {
        request = request.header(MCP_SESSION_ID_HEADER, id);
    }
    app.router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

pub fn initialize_request() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "integration-test", "version": "1.0" }
        }
    })
}

/// Run the initialize handshake and return the new session id.
pub async fn initialize(app: &TestApp) -> String {
    let reply = post(app, None, initialize_request()).await;
    assert_eq!(reply.status, StatusCode::OK);
    let id = reply.session_id().expect("initialize returns a session id");
    let ack = post(
        app,
        Some(&id),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert_eq!(ack.status, StatusCode::ACCEPTED);
    id
}

/// Call a tool on an established session.
pub async fn call_tool(app: &TestApp, session: &str, name: &str, arguments: Value) -> RpcReply {
    post(
        app,
        Some(session),
        json!({
            "jsonrpc": "2.0",
            "id": 42,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }),
    )
    .await
}
