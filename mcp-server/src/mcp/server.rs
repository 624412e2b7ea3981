//! Per-session MCP protocol server.
//!
//! Dispatches JSON-RPC methods against the session's own tool registry and
//! the embedded widget resources.

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::protocol::{
    JsonRpcMessage, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
    RESOURCE_NOT_FOUND,
};
use crate::tools::{ToolError, ToolOutput, ToolRegistry};
use crate::widgets;

/// Protocol versions we accept, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &["2025-06-18", "2025-03-26", "2024-11-05", "2024-10-07"];

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "vita-health";

/// Tool call parameters from MCP.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    protocol_version: Option<String>,
}

/// An MCP server instance bound to one session.
pub struct McpServer {
    tools: ToolRegistry,
    requests_handled: AtomicU64,
}

impl McpServer {
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools,
            requests_handled: AtomicU64::new(0),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Number of JSON-RPC messages dispatched to this instance.
    pub fn requests_handled(&self) -> u64 {
        self.requests_handled.load(Ordering::Relaxed)
    }

    /// Handle one JSON-RPC message. Notifications and client responses yield
    /// `None`.
    pub async fn handle(&self, message: JsonRpcMessage) -> Option<JsonRpcResponse> {
        let method = message.method?;
        self.requests_handled.fetch_add(1, Ordering::Relaxed);
        debug!("MCP: Handling method: {}", method);

        // Notifications (initialized, cancelled, ...) need no response
        message.id.as_ref()?;
        let id = message.id;
        let params = message.params.unwrap_or_else(|| json!({}));

        let response = match method.as_str() {
            "initialize" => Self::handle_initialize(id, params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, params).await,
            "resources/list" => Self::handle_list_resources(id),
            "resources/templates/list" => {
                JsonRpcResponse::success(id, json!({ "resourceTemplates": [] }))
            }
            "resources/read" => Self::handle_read_resource(id, params),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(id: Option<Value>, params: Value) -> JsonRpcResponse {
        let requested = serde_json::from_value::<InitializeParams>(params)
            .unwrap_or_default()
            .protocol_version;
        let version = requested
            .as_deref()
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": version,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "resources": { "listChanged": false }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<Value> = self.tools.descriptors().map(|d| d.to_json()).collect();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                )
            }
        };
        let arguments = call.arguments.unwrap_or_else(|| json!({}));

        match self.tools.call(&call.name, arguments).await {
            Ok(output) => JsonRpcResponse::success(id, output.to_json(false)),
            Err(ToolError::Worker(e)) => {
                warn!("MCP: Tool {} failed: {}", call.name, e);
                JsonRpcResponse::success(id, ToolOutput::text(e.to_string()).to_json(true))
            }
            Err(ToolError::InvalidParams(msg)) => JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid arguments for tool {}: {}", call.name, msg),
            ),
            Err(e @ ToolError::UnknownTool(_)) => {
                JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())
            }
            Err(e @ ToolError::Encode(_)) => {
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Tool call failed: {}", e))
            }
        }
    }

    fn handle_list_resources(id: Option<Value>) -> JsonRpcResponse {
        let resources: Vec<Value> = widgets::list().iter().map(|w| w.listing()).collect();
        JsonRpcResponse::success(id, json!({ "resources": resources }))
    }

    fn handle_read_resource(id: Option<Value>, params: Value) -> JsonRpcResponse {
        let uri = match serde_json::from_value::<ResourceReadParams>(params) {
            Ok(params) => params.uri,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid resources/read params: {}", e),
                )
            }
        };
        match widgets::read(&uri) {
            Some(widget) => JsonRpcResponse::success(id, json!({ "contents": [widget.contents()] })),
            None => JsonRpcResponse::error_with_data(
                id,
                RESOURCE_NOT_FOUND,
                "Resource not found",
                json!({ "uri": uri }),
            ),
        }
    }
}
