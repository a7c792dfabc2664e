//! JSON-RPC 2.0 message types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Invalid JSON
pub const PARSE_ERROR: i32 = -32700;
/// Unknown method
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Missing or invalid parameters, unknown tool
pub const INVALID_PARAMS: i32 = -32602;

/// MCP revision implemented by the server
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request or notification
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
  #[serde(default)]
  pub jsonrpc: String,
  pub id: Option<Value>,
  pub method: String,
  pub params: Option<Value>,
}

impl JsonRpcRequest {
  /// Notifications never receive a response
  pub fn is_notification(&self) -> bool {
    self.method.starts_with("notifications/")
  }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
  pub jsonrpc: String,
  pub id: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
  pub code: i32,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

impl JsonRpcResponse {
  pub fn success(id: Value, result: Value) -> Self {
    Self {
      jsonrpc: "2.0".to_string(),
      id,
      result: Some(result),
      error: None,
    }
  }

  pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
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
}
