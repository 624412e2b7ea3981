//! MCP session management.
//!
//! Maps inbound protocol traffic onto isolated per-session server instances.
//! A session enters the table only after its transport has completed the
//! `initialize` handshake, and leaves it when that transport closes.

use axum::{
    body::Bytes,
    http::{HeaderMap, Method},
    response::Response,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{McpServer, SessionError, SessionTransport, MCP_SESSION_ID_HEADER};
use crate::client::HealthBackend;
use crate::tools::ToolRegistry;

/// A live session: one server bound to one transport.
struct Session {
    server: Arc<McpServer>,
    transport: Arc<SessionTransport>,
}

type SessionTable = Arc<RwLock<HashMap<String, Session>>>;

/// Manager for MCP sessions.
///
/// The table lock is never held across an await point.
#[derive(Clone)]
pub struct McpSessionManager {
    sessions: SessionTable,
    backend: Arc<dyn HealthBackend>,
    instances_created: Arc<AtomicU64>,
}

/// Extract session ID from headers.
fn get_session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}

impl McpSessionManager {
    /// Create a new session manager whose sessions share `backend`.
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            backend,
            instances_created: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Route one protocol request to its session, creating a session when the
    /// request names none or names one that is not live.
    pub async fn handle_connection(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, SessionError> {
        if let Some(id) = get_session_id(headers) {
            let existing = self.sessions.read().get(id).map(|s| s.transport.clone());
            if let Some(transport) = existing {
                return transport.handle_request(method, headers, body).await;
            }
            debug!("MCP: Unknown session {}, treating as new", id);
        }

        let server = Arc::new(McpServer::new(ToolRegistry::new(self.backend.clone())));
        self.instances_created.fetch_add(1, Ordering::Relaxed);

        let transport = Arc::new(SessionTransport::new());
        transport.connect(server.clone())?;

        let table = Arc::downgrade(&self.sessions);
        transport.on_close(move |id| {
            if let Some(table) = table.upgrade() {
                if table.write().remove(id).is_some() {
                    info!("MCP: Session terminated: {}", id);
                }
            }
        });

        let response = transport.handle_request(method, headers, body).await?;

        if let Some(id) = transport.session_id() {
            if !transport.is_closed() {
                info!("MCP: New session initialized: {}", id);
                self.sessions.write().insert(
                    id.to_string(),
                    Session {
                        server,
                        transport: transport.clone(),
                    },
                );
            }
        }
        Ok(response)
    }

    /// Close every session idle for at least `timeout`. A session holding an
    /// open SSE stream is never idle. Returns how many were closed.
    pub fn reap_idle(&self, timeout: Duration) -> usize {
        let idle: Vec<Arc<SessionTransport>> = self
            .sessions
            .read()
            .values()
            .filter(|s| !s.transport.is_streaming() && s.transport.idle_for() >= timeout)
            .map(|s| s.transport.clone())
            .collect();
        for transport in &idle {
            transport.close();
        }
        idle.len()
    }

    /// Periodically close idle sessions.
    pub fn spawn_idle_reaper(&self, timeout: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        let period = (timeout / 2).clamp(Duration::from_secs(1), Duration::from_secs(60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let reaped = manager.reap_idle(timeout);
                if reaped > 0 {
                    info!("MCP: Closed {} idle session(s)", reaped);
                }
            }
        })
    }

    /// Close all sessions, e.g. on shutdown.
    pub fn close_all(&self) {
        let transports: Vec<Arc<SessionTransport>> = self
            .sessions
            .read()
            .values()
            .map(|s| s.transport.clone())
            .collect();
        for transport in transports {
            transport.close();
        }
    }

    /// Get the number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Check if a session exists.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Total server instances constructed since startup.
    pub fn instances_created(&self) -> u64 {
        self.instances_created.load(Ordering::Relaxed)
    }

    /// The server instance bound to a live session.
    pub fn server_for(&self, id: &str) -> Option<Arc<McpServer>> {
        self.sessions.read().get(id).map(|s| s.server.clone())
    }

    /// Close one session, as an explicit termination would.
    pub fn terminate(&self, id: &str) -> bool {
        let transport = self.sessions.read().get(id).map(|s| s.transport.clone());
        match transport {
            Some(transport) => {
                transport.close();
                true
            }
            None => false,
        }
    }
}
