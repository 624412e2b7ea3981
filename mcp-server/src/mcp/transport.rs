//! Streamable HTTP transport for a single MCP session.
//!
//! A transport is created fresh for every candidate session. It assigns the
//! session id when it sees the `initialize` handshake, serializes the
//! session's POST requests, holds the optional server-to-client SSE stream,
//! and fires its close callback exactly once.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::protocol::{
    JsonRpcResponse, Payload, INVALID_REQUEST, SERVER_ERROR, SESSION_NOT_FOUND,
};
use super::{McpServer, MCP_SESSION_ID_HEADER};

/// SSE keep-alive interval.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

type CloseCallback = Box<dyn FnOnce(&str) + Send>;

/// Errors raised while serving a protocol request.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Transport is not connected to a server")]
    NotConnected,

    #[error("Transport is already connected to a server")]
    AlreadyConnected,

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to build response: {0}")]
    Http(#[from] axum::http::Error),
}

/// Transport state for one session.
pub struct SessionTransport {
    session_id: OnceLock<String>,
    server: OnceLock<Arc<McpServer>>,
    /// Held while a POST is dispatched so a session handles one request at a time.
    request_lock: tokio::sync::Mutex<()>,
    on_close: Mutex<Option<CloseCallback>>,
    closed: CancellationToken,
    last_activity: Arc<Mutex<Instant>>,
    stream_open: Arc<AtomicBool>,
}

impl SessionTransport {
    pub fn new() -> Self {
        Self {
            session_id: OnceLock::new(),
            server: OnceLock::new(),
            request_lock: tokio::sync::Mutex::new(()),
            on_close: Mutex::new(None),
            closed: CancellationToken::new(),
            last_activity: Arc::new(Mutex::new(Instant::now())),
            stream_open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach the protocol server. A transport serves exactly one server.
    pub fn connect(&self, server: Arc<McpServer>) -> Result<(), SessionError> {
        self.server
            .set(server)
            .map_err(|_| SessionError::AlreadyConnected)
    }

    /// Register the callback fired when the transport closes. Replaces any
    /// earlier registration.
    pub fn on_close(&self, callback: impl FnOnce(&str) + Send + 'static) {
        *self.on_close.lock() = Some(Box::new(callback));
    }

    /// Session id, known once `initialize` has been handled.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Time since the last request reached this transport, or since its SSE
    /// stream ended. Zero while a stream is open.
    pub fn idle_for(&self) -> Duration {
        if self.is_streaming() {
            return Duration::ZERO;
        }
        self.last_activity.lock().elapsed()
    }

    /// Whether a client currently holds the SSE stream.
    pub fn is_streaming(&self) -> bool {
        self.stream_open.load(Ordering::Acquire)
    }

    /// Close the transport: end any open SSE stream and fire the close
    /// callback. Safe to call repeatedly; the callback runs at most once.
    pub fn close(&self) {
        self.closed.cancel();
        let callback = self.on_close.lock().take();
        if let (Some(callback), Some(id)) = (callback, self.session_id()) {
            callback(id);
        }
    }

    /// Handle one HTTP request addressed to this session.
    pub async fn handle_request(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, SessionError> {
        *self.last_activity.lock() = Instant::now();

        if self.is_closed() {
            return Ok(rpc_error(
                StatusCode::NOT_FOUND,
                SESSION_NOT_FOUND,
                "Session not found",
            ));
        }

        match *method {
            Method::POST => self.handle_post(body).await,
            Method::GET => self.handle_get(headers),
            Method::DELETE => self.handle_delete(),
            _ => Ok(Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(header::ALLOW, "GET, POST, DELETE")
                .body(Body::empty())?),
        }
    }

    async fn handle_post(&self, body: Bytes) -> Result<Response, SessionError> {
        let server = self.server.get().ok_or(SessionError::NotConnected)?;

        let payload = match Payload::parse(&body) {
            Ok(payload) => payload,
            Err((code, message)) => return Ok(rpc_error(StatusCode::BAD_REQUEST, code, message)),
        };

        let init_count = payload.messages().iter().filter(|m| m.is_initialize()).count();
        if init_count > 0 {
            if self.session_id().is_some() {
                return Ok(rpc_error(
                    StatusCode::BAD_REQUEST,
                    INVALID_REQUEST,
                    "Invalid Request: Server already initialized",
                ));
            }
            if payload.messages().len() > 1 {
                return Ok(rpc_error(
                    StatusCode::BAD_REQUEST,
                    INVALID_REQUEST,
                    "Invalid Request: Only one initialization request is allowed",
                ));
            }
            let id = Uuid::new_v4().to_string();
            debug!("MCP: Assigned session id {}", id);
            let _ = self.session_id.set(id);
        } else if self.session_id().is_none() {
            return Ok(not_initialized());
        }

        let is_batch = payload.is_batch();
        let mut responses = Vec::new();
        {
            let _guard = self.request_lock.lock().await;
            for message in payload.into_messages() {
                if let Some(response) = server.handle(message).await {
                    responses.push(response);
                }
            }
        }

        if responses.is_empty() {
            return self.with_session_header(StatusCode::ACCEPTED, Body::empty(), None);
        }

        let json = if is_batch {
            serde_json::to_vec(&responses)?
        } else {
            serde_json::to_vec(&responses[0])?
        };
        self.with_session_header(StatusCode::OK, Body::from(json), Some("application/json"))
    }

    fn handle_get(&self, headers: &HeaderMap) -> Result<Response, SessionError> {
        if self.session_id().is_none() {
            return Ok(not_initialized());
        }

        let accepts_sse = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/event-stream") || v.contains("*/*"))
            .unwrap_or(true);
        if !accepts_sse {
            return Ok(rpc_error(
                StatusCode::NOT_ACCEPTABLE,
                SERVER_ERROR,
                "Not Acceptable: Client must accept text/event-stream",
            ));
        }

        if self.stream_open.swap(true, Ordering::AcqRel) {
            return Ok(rpc_error(
                StatusCode::CONFLICT,
                SERVER_ERROR,
                "Conflict: Only one SSE stream is allowed per session",
            ));
        }

        let guard = StreamGuard {
            open: self.stream_open.clone(),
            last_activity: self.last_activity.clone(),
        };
        let closed = self.closed.clone();
        // No server-initiated messages are produced; the stream only carries
        // keep-alives until the session closes or the client goes away.
        let events = stream::pending::<Result<Event, Infallible>>().take_until(async move {
            let _guard = guard;
            closed.cancelled().await;
        });

        info!("MCP: SSE stream opened for session {:?}", self.session_id());
        let mut response = Sse::new(events)
            .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
            .into_response();
        self.insert_session_header(&mut response);
        Ok(response)
    }

    fn handle_delete(&self) -> Result<Response, SessionError> {
        if self.session_id().is_none() {
            return Ok(not_initialized());
        }
        self.close();
        Ok(StatusCode::OK.into_response())
    }

    fn with_session_header(
        &self,
        status: StatusCode,
        body: Body,
        content_type: Option<&'static str>,
    ) -> Result<Response, SessionError> {
        let mut builder = Response::builder().status(status);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let mut response = builder.body(body)?;
        self.insert_session_header(&mut response);
        Ok(response)
    }

    fn insert_session_header(&self, response: &mut Response) {
        if let Some(hv) = self.session_id().and_then(|id| HeaderValue::from_str(id).ok()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(MCP_SESSION_ID_HEADER), hv);
        }
    }
}

impl Default for SessionTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the open-stream flag when the SSE stream ends or is dropped.
/// Marks the SSE stream as held; the idle clock restarts when it is released.
struct StreamGuard {
    open: Arc<AtomicBool>,
    last_activity: Arc<Mutex<Instant>>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        *self.last_activity.lock() = Instant::now();
        self.open.store(false, Ordering::Release);
    }
}

fn rpc_error(status: StatusCode, code: i32, message: &str) -> Response {
    (status, Json(JsonRpcResponse::error(None, code, message))).into_response()
}

fn not_initialized() -> Response {
    rpc_error(
        StatusCode::BAD_REQUEST,
        SERVER_ERROR,
        "Bad Request: Server not initialized",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HealthBackend, WorkerError};
    use crate::tools::ToolRegistry;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;

    struct NoBackend;

    #[async_trait]
    impl HealthBackend for NoBackend {
        async fn fetch(&self, _path: &str, _params: &[(&str, String)]) -> Result<Value, WorkerError> {
            Ok(json!({}))
        }
    }

    fn connected() -> SessionTransport {
        let transport = SessionTransport::new();
        transport
            .connect(Arc::new(McpServer::new(ToolRegistry::new(Arc::new(NoBackend)))))
            .unwrap();
        transport
    }

    fn initialize_body() -> Bytes {
        Bytes::from(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": { "protocolVersion": "2025-03-26", "capabilities": {}, "clientInfo": { "name": "test", "version": "0" } }
            })
            .to_string(),
        )
    }

    async fn post(transport: &SessionTransport, body: Bytes) -> Response {
        transport
            .handle_request(&Method::POST, &HeaderMap::new(), body)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_assigns_session_id() {
        let transport = connected();
        assert!(transport.session_id().is_none());

        let response = post(&transport, initialize_body()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = transport.session_id().unwrap().to_string();
        assert_eq!(response.headers()[MCP_SESSION_ID_HEADER], id.as_str());

        let response = post(&transport, initialize_body()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transport.session_id(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_requests_before_initialize_rejected() {
        let transport = connected();
        let response = post(
            &transport,
            Bytes::from_static(br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(transport.session_id().is_none());
    }

    #[tokio::test]
    async fn test_notification_accepted() {
        let transport = connected();
        post(&transport, initialize_body()).await;
        let response = post(
            &transport,
            Bytes::from_static(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_close_callback_runs_once() {
        let transport = connected();
        post(&transport, initialize_body()).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        transport.on_close(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        transport.close();
        transport.close();
        assert!(transport.is_closed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let response = post(
            &transport,
            Bytes::from_static(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_single_sse_stream() {
        let transport = connected();
        post(&transport, initialize_body()).await;

        let first = transport
            .handle_request(&Method::GET, &HeaderMap::new(), Bytes::new())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = transport
            .handle_request(&Method::GET, &HeaderMap::new(), Bytes::new())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        drop(first);
        let third = transport
            .handle_request(&Method::GET, &HeaderMap::new(), Bytes::new())
            .await
            .unwrap();
        assert_eq!(third.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_open_stream_counts_as_activity() {
        let transport = connected();
        post(&transport, initialize_body()).await;

        let stream = transport
            .handle_request(&Method::GET, &HeaderMap::new(), Bytes::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(transport.is_streaming());
        assert_eq!(transport.idle_for(), Duration::ZERO);

        drop(stream);
        assert!(!transport.is_streaming());
        assert!(transport.idle_for() < Duration::from_millis(20));
    }

    #[test]
    fn test_connect_twice() {
        let transport = connected();
        let server = Arc::new(McpServer::new(ToolRegistry::empty()));
        assert!(matches!(
            transport.connect(server),
            Err(SessionError::AlreadyConnected)
        ));
    }
}
