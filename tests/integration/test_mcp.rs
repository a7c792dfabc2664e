//! Tests for the stdio MCP transport

use crate::helpers::*;
use anyhow::Result;
use serde_json::json;

#[test]
fn test_stdio_session() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let responses = mcp_session(
    &workspace.path,
    &[
      r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}}}"#,
      r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
      r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
      r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
    ],
  )?;

  // The notification gets no response
  assert_eq!(responses.len(), 3);

  assert_eq!(responses[0]["id"], 1);
  assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
  assert_eq!(responses[0]["result"]["serverInfo"]["name"], "Tekton Release MCP Server");

  let tools = responses[1]["result"]["tools"].as_array().expect("tools array");
  assert_eq!(tools.len(), 3);
  for tool in tools {
    assert_eq!(tool["inputSchema"]["required"], json!(["minor_version"]));
  }

  assert_eq!(responses[2], json!({"jsonrpc": "2.0", "id": 3, "result": {}}));
  Ok(())
}

#[test]
fn test_protocol_errors() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let responses = mcp_session(
    &workspace.path,
    &[
      r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create-release-branches","arguments":{}}}"#,
      r#"{"jsonrpc":"2.0","id":2,"method":"prompts/list"}"#,
      r#"{"jsonrpc":"2.0","id":3,"#,
      r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"configure-hack-repo","arguments":{"minor_version":17}}}"#,
    ],
  )?;

  assert_eq!(responses.len(), 4);
  assert_eq!(responses[0]["error"]["code"], -32602);
  assert_eq!(responses[0]["error"]["message"], "minor_version parameter is required");
  assert_eq!(responses[1]["error"]["code"], -32601);
  assert_eq!(responses[2]["error"]["code"], -32700);
  assert_eq!(responses[2]["id"], serde_json::Value::Null);
  assert_eq!(responses[3]["error"]["code"], -32602);
  Ok(())
}

#[test]
fn test_tool_failure_is_reported_in_result() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  // No GitLab credentials in the environment
  let responses = mcp_session(
    &workspace.path,
    &[r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"create-release-plans","arguments":{"minor_version":"1.21"}}}"#],
  )?;

  assert_eq!(responses.len(), 1);
  let result = &responses[0]["result"];
  assert_eq!(result["isError"], true);
  let text = result["content"][0]["text"].as_str().expect("text content");
  assert!(text.starts_with("Failed to create release plans: "), "{}", text);
  assert!(text.contains("GITLAB_USERNAME"));
  Ok(())
}
