//! Tool registry: schemas, argument extraction and dispatch

use crate::commands::{self, HackRequest, PlanRequest};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult, ValidationError};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const CREATE_RELEASE_BRANCHES: &str = "create-release-branches";
pub const CONFIGURE_HACK_REPO: &str = "configure-hack-repo";
pub const CREATE_RELEASE_PLANS: &str = "create-release-plans";

/// `tools/list` payload
pub fn definitions() -> Value {
  json!([
    {
      "name": CREATE_RELEASE_BRANCHES,
      "description": "Creates release branches for Tekton components",
      "inputSchema": {
        "type": "object",
        "properties": {
          "minor_version": {
            "type": "string",
            "description": "Minor version number (e.g., '1.19')"
          }
        },
        "required": ["minor_version"]
      }
    },
    {
      "name": CONFIGURE_HACK_REPO,
      "description": "Configures the hack repository for a new release and creates a pull request",
      "inputSchema": {
        "type": "object",
        "properties": {
          "minor_version": {
            "type": "string",
            "description": "Minor version number (e.g., '1.21')"
          },
          "ocp_version": {
            "type": "string",
            "description": "OpenShift Container Platform version"
          },
          "upstream_versions": {
            "type": "object",
            "additionalProperties": {
              "type": "string",
              "description": "Upstream version for each component (e.g., '0.25.x' for chains)"
            },
            "description": "Map of component names to their upstream versions"
          }
        },
        "required": ["minor_version"]
      }
    },
    {
      "name": CREATE_RELEASE_PLANS,
      "description": "Creates ReleasePlanAdmission and ReleasePlan files for Tekton components",
      "inputSchema": {
        "type": "object",
        "properties": {
          "minor_version": {
            "type": "string",
            "description": "Minor version number (e.g., '1.21')"
          },
          "patch_version": {
            "type": "string",
            "description": "Optional patch version number"
          },
          "ocp_versions": {
            "type": "array",
            "items": { "type": "string" },
            "description": "List of OCP versions (e.g., ['4-15', '4-16']). Defaults to ['4-15', '4-16', '4-17', '4-18', '4-19']"
          }
        },
        "required": ["minor_version"]
      }
    }
  ])
}

/// A validated tool invocation
#[derive(Debug, Clone)]
pub enum ToolCall {
  CreateReleaseBranches { minor: String },
  ConfigureHackRepo(HackRequest),
  CreateReleasePlans(PlanRequest),
}

impl ToolCall {
  /// Validate `arguments` for tool `name`
  ///
  /// Fails with a validation error before anything touches the network.
  pub fn parse(name: &str, arguments: &Value) -> ReleaseResult<Self> {
    let empty = Map::new();
    let args = arguments.as_object().unwrap_or(&empty);

    let call = match name {
      CREATE_RELEASE_BRANCHES => ToolCall::CreateReleaseBranches {
        minor: required_string(args, "minor_version")?,
      },
      CONFIGURE_HACK_REPO => ToolCall::ConfigureHackRepo(HackRequest {
        minor: required_string(args, "minor_version")?,
        ocp_version: optional_string(args, "ocp_version"),
        upstream_versions: string_map(args, "upstream_versions"),
      }),
      CREATE_RELEASE_PLANS => ToolCall::CreateReleasePlans(PlanRequest::new(
        required_string(args, "minor_version")?,
        optional_string(args, "patch_version"),
        string_list(args, "ocp_versions"),
      )),
      other => {
        return Err(ReleaseError::Validation(ValidationError::InvalidValue {
          field: "tool".to_string(),
          reason: format!("Unknown tool: {}", other),
        }));
      }
    };
    Ok(call)
  }

  pub fn name(&self) -> &'static str {
    match self {
      ToolCall::CreateReleaseBranches { .. } => CREATE_RELEASE_BRANCHES,
      ToolCall::ConfigureHackRepo(_) => CONFIGURE_HACK_REPO,
      ToolCall::CreateReleasePlans(_) => CREATE_RELEASE_PLANS,
    }
  }

  /// Prefix of the failure text reported to the caller
  pub fn failure_prefix(&self) -> &'static str {
    match self {
      ToolCall::CreateReleaseBranches { .. } => "Failed to create branches",
      ToolCall::ConfigureHackRepo(_) => "Failed to configure hack repository",
      ToolCall::CreateReleasePlans(_) => "Failed to create release plans",
    }
  }

  /// Run the workflow, blocking until every subprocess has finished
  pub fn execute(&self, ctx: &ReleaseContext) -> ReleaseResult<String> {
    match self {
      ToolCall::CreateReleaseBranches { minor } => commands::run_create_release_branches(ctx, minor),
      ToolCall::ConfigureHackRepo(request) => commands::run_configure_hack_repo(ctx, request),
      ToolCall::CreateReleasePlans(request) => commands::run_create_release_plans(ctx, request),
    }
  }
}

/// Non-empty string argument; anything else counts as missing
fn required_string(args: &Map<String, Value>, key: &str) -> ReleaseResult<String> {
  optional_string(args, key).ok_or_else(|| {
    ValidationError::MissingParameter {
      name: key.to_string(),
    }
    .into()
  })
}

fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
  args
    .get(key)
    .and_then(Value::as_str)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// Object of strings; non-string values are dropped
fn string_map(args: &Map<String, Value>, key: &str) -> BTreeMap<String, String> {
  args
    .get(key)
    .and_then(Value::as_object)
    .map(|object| {
      object
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
    })
    .unwrap_or_default()
}

/// Array of strings; non-string items are dropped
fn string_list(args: &Map<String, Value>, key: &str) -> Vec<String> {
  args
    .get(key)
    .and_then(Value::as_array)
    .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
    .unwrap_or_default()
}
