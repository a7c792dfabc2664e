//! Shared release context - built once, passed to every tool invocation
//!
//! # Design
//!
//! `ReleaseContext` holds the immutable release tables behind an `Arc`, so the
//! MCP server can hand a cheap clone to each blocking tool call. Invocations
//! never share a working directory: each one asks for its own scratch checkout
//! via [`ReleaseContext::scratch_dir`], removed when the returned guard drops.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseResult, ResultExt, ValidationError};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Environment variable holding the GitLab user for release plans
pub const GITLAB_USERNAME_VAR: &str = "GITLAB_USERNAME";
/// Environment variable holding the GitLab token for release plans
pub const GITLAB_TOKEN_VAR: &str = "GITLAB_TOKEN";

/// Immutable context shared by all tool invocations
#[derive(Clone)]
pub struct ReleaseContext {
  /// Release tables (repositories, component mapping, groups, remotes)
  pub config: Arc<ReleaseConfig>,
}

impl ReleaseContext {
  pub fn new(config: ReleaseConfig) -> Self {
    Self {
      config: Arc::new(config),
    }
  }

  /// Load the configuration (explicit path or search from `cwd`)
  pub fn load(explicit: Option<&Path>, cwd: &Path) -> ReleaseResult<Self> {
    Ok(Self::new(ReleaseConfig::load(explicit, cwd)?))
  }

  /// Fresh scratch directory for one invocation
  pub fn scratch_dir(&self, prefix: &str) -> ReleaseResult<TempDir> {
    tempfile::Builder::new()
      .prefix(prefix)
      .tempdir()
      .with_context(|| format!("Failed to create temporary directory for {}", prefix.trim_end_matches('-')))
  }
}

/// GitLab username and token used to clone and push the release data repository
#[derive(Clone)]
pub struct GitlabCredentials {
  pub username: String,
  pub token: String,
}

impl GitlabCredentials {
  /// Read `GITLAB_USERNAME` and `GITLAB_TOKEN` from the process environment
  pub fn from_env() -> ReleaseResult<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Read credentials through `lookup`; both values must be non-empty
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReleaseResult<Self> {
    let username = lookup(GITLAB_USERNAME_VAR).unwrap_or_default();
    let token = lookup(GITLAB_TOKEN_VAR).unwrap_or_default();
    if username.is_empty() || token.is_empty() {
      return Err(
        ValidationError::MissingCredentials {
          variables: vec![GITLAB_USERNAME_VAR.to_string(), GITLAB_TOKEN_VAR.to_string()],
        }
        .into(),
      );
    }
    Ok(Self { username, token })
  }
}

impl fmt::Debug for GitlabCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GitlabCredentials")
      .field("username", &self.username)
      .field("token", &"[REDACTED]")
      .finish()
  }
}
