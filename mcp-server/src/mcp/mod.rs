//! MCP (Model Context Protocol) Streamable HTTP support.
//!
//! Every client session gets its own [`McpServer`] and [`SessionTransport`]
//! pair, keyed by the `mcp-session-id` header in the [`McpSessionManager`]
//! table.
//!
//! ## Endpoint
//!
//! - `POST /mcp` - Send JSON-RPC requests, notifications or batches
//! - `GET /mcp` - Open SSE stream for server messages
//! - `DELETE /mcp` - Terminate session
//!
//! ## Session Management
//!
//! Sessions are identified by the `mcp-session-id` header, assigned during
//! initialization and required for subsequent requests. A request naming an
//! unknown session is treated as a request without one.

pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcMessage, JsonRpcResponse};
pub use server::McpServer;
pub use session::McpSessionManager;
pub use transport::{SessionError, SessionTransport};

/// Header name for MCP session ID.
pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";
