//! MCP request dispatch
//!
//! The server is transport-agnostic: a transport feeds it one JSON-RPC message
//! at a time and writes back whatever [`McpServer::handle_message`] returns.
//! Tool calls block until every subprocess of the workflow has exited, so the
//! HTTP transport moves them onto the blocking pool.

use super::protocol::{INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION};
use super::tools::{self, ToolCall};
use crate::core::context::ReleaseContext;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

const SERVER_NAME: &str = "Tekton Release MCP Server";
const SERVER_TITLE: &str = "Tekton Release Management Server";
const INSTRUCTIONS: &str = "This server provides tools for managing Tekton releases:\n\
- Creating release branches\n\
- Configuring hack repository\n\
- Managing ReleasePlanAdmission and ReleasePlan files";

#[derive(Clone)]
pub struct McpServer {
  ctx: ReleaseContext,
}

impl McpServer {
  pub fn new(ctx: ReleaseContext) -> Self {
    Self { ctx }
  }

  /// Handle one raw message; `None` when nothing should be sent back
  pub fn handle_message(&self, raw: &str) -> Option<String> {
    let response = match serde_json::from_str::<JsonRpcRequest>(raw) {
      Ok(request) => self.handle(request)?,
      Err(e) => {
        warn!(error = %e, "rejecting malformed message");
        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
      }
    };

    match serde_json::to_string(&response) {
      Ok(text) => Some(text),
      Err(e) => {
        error!(error = %e, "failed to serialize response");
        None
      }
    }
  }

  /// Dispatch a parsed request; notifications yield `None`
  pub fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.is_notification() {
      debug!(method = %request.method, "notification");
      return None;
    }

    if request.jsonrpc != "2.0" {
      debug!(jsonrpc = %request.jsonrpc, "unexpected jsonrpc version");
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let response = match request.method.as_str() {
      "initialize" => JsonRpcResponse::success(id, initialize_result()),
      "ping" => JsonRpcResponse::success(id, json!({})),
      "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tools::definitions() })),
      "tools/call" => self.handle_tool_call(id, request.params.as_ref()),
      other => {
        debug!(method = %other, "unknown method");
        JsonRpcResponse::error(id, METHOD_NOT_FOUND, "Method not found")
      }
    };
    Some(response)
  }

  fn handle_tool_call(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
    let Some(params) = params else {
      return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params");
    };

    let name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let call = match ToolCall::parse(name, &arguments) {
      Ok(call) => call,
      Err(e) => {
        warn!(tool = %name, error = %e, "invalid tool call");
        return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string());
      }
    };

    info!(tool = call.name(), "tool call started");
    match call.execute(&self.ctx) {
      Ok(text) => {
        info!(tool = call.name(), "tool call finished");
        JsonRpcResponse::success(id, tool_result(&text, false))
      }
      Err(e) => {
        if e.is_validation() {
          warn!(tool = call.name(), error = %e, "tool call rejected");
        } else {
          error!(tool = call.name(), error = %e, "tool call failed");
        }
        let text = format!("{}: {}", call.failure_prefix(), e);
        JsonRpcResponse::success(id, tool_result(&text, true))
      }
    }
  }
}

fn initialize_result() -> Value {
  json!({
    "protocolVersion": PROTOCOL_VERSION,
    "capabilities": {
      "tools": {}
    },
    "serverInfo": {
      "name": SERVER_NAME,
      "title": SERVER_TITLE,
      "version": env!("CARGO_PKG_VERSION")
    },
    "instructions": INSTRUCTIONS
  })
}

fn tool_result(text: &str, is_error: bool) -> Value {
  let mut result = json!({
    "content": [{
      "type": "text",
      "text": text
    }]
  });
  if is_error {
    result["isError"] = Value::Bool(true);
  }
  result
}
