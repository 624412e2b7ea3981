//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
/// Transport-level rejection (session not initialized, conflicting stream).
pub const SERVER_ERROR: i32 = -32000;
pub const SESSION_NOT_FOUND: i32 = -32001;
pub const RESOURCE_NOT_FOUND: i32 = -32002;

/// An inbound JSON-RPC message: request, notification, or a client response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcMessage {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcMessage {
    /// Requests carry both a method and an id and expect a response.
    pub fn is_request(&self) -> bool {
        self.method.is_some() && self.id.is_some()
    }

    pub fn is_initialize(&self) -> bool {
        self.is_request() && self.method.as_deref() == Some("initialize")
    }
}

/// A POST body: one message or a batch.
#[derive(Debug)]
pub enum Payload {
    Single(JsonRpcMessage),
    Batch(Vec<JsonRpcMessage>),
}

impl Payload {
    /// Parse a POST body. `Err` carries the JSON-RPC error code to answer with.
    pub fn parse(body: &[u8]) -> Result<Self, (i32, &'static str)> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| (PARSE_ERROR, "Parse error"))?;
        let invalid = |_| (INVALID_REQUEST, "Invalid Request");
        match value {
            Value::Array(items) if items.is_empty() => Err((INVALID_REQUEST, "Invalid Request")),
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Payload::Batch)
                .map_err(invalid),
            value => serde_json::from_value(value)
                .map(Payload::Single)
                .map_err(invalid),
        }
    }

    pub fn messages(&self) -> &[JsonRpcMessage] {
        match self {
            Payload::Single(message) => std::slice::from_ref(message),
            Payload::Batch(messages) => messages,
        }
    }

    pub fn into_messages(self) -> Vec<JsonRpcMessage> {
        match self {
            Payload::Single(message) => vec![message],
            Payload::Batch(messages) => messages,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }
}

/// JSON-RPC 2.0 Response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Create an error response with data.
    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: Some(data),
            }),
        }
    }
}

/// JSON-RPC 2.0 Error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_batch() {
        let single = Payload::parse(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert!(!single.is_batch());
        assert!(single.messages()[0].is_request());

        let batch = Payload::parse(
            br#"[{"jsonrpc":"2.0","method":"notifications/initialized"},{"jsonrpc":"2.0","id":"a","method":"ping"}]"#,
        )
        .unwrap();
        assert!(batch.is_batch());
        assert_eq!(batch.messages().len(), 2);
        assert!(!batch.messages()[0].is_request());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Payload::parse(b"{not json").unwrap_err().0, PARSE_ERROR);
        assert_eq!(Payload::parse(b"[]").unwrap_err().0, INVALID_REQUEST);
        assert_eq!(Payload::parse(b"42").unwrap_err().0, INVALID_REQUEST);
    }

    #[test]
    fn test_null_id_is_notification() {
        let payload = Payload::parse(br#"{"jsonrpc":"2.0","id":null,"method":"initialize"}"#).unwrap();
        assert!(!payload.messages()[0].is_initialize());
    }

    #[test]
    fn test_error_serialization_omits_result() {
        let value = serde_json::to_value(JsonRpcResponse::error(None, METHOD_NOT_FOUND, "nope")).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
        assert!(value["id"].is_null());
    }
}
