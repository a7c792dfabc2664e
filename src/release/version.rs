//! Release type and version resolution

use crate::core::error::{ReleaseResult, ValidationError};
use serde::Serialize;
use std::fmt;

/// Advisory type attached to release notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReleaseType {
  /// Enhancement advisory, used for minor releases
  #[serde(rename = "RHEA")]
  Enhancement,
  /// Bug fix advisory, used for patch releases
  #[serde(rename = "RHBA")]
  BugFix,
}

impl ReleaseType {
  pub fn as_str(self) -> &'static str {
    match self {
      ReleaseType::Enhancement => "RHEA",
      ReleaseType::BugFix => "RHBA",
    }
  }
}

impl fmt::Display for ReleaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A requested release: minor version plus optional patch
///
/// Beyond being non-empty (see [`require_minor`]) no syntax validation is
/// performed; any string is taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
  pub minor: String,
  pub patch: Option<String>,
}

impl ReleaseVersion {
  /// An empty patch string counts as no patch
  pub fn new(minor: impl Into<String>, patch: Option<String>) -> Self {
    Self {
      minor: minor.into(),
      patch: patch.filter(|p| !p.is_empty()),
    }
  }

  /// Resolve release type and full version
  pub fn resolve(&self) -> ResolvedRelease {
    let (release_type, full_version) = resolve(&self.minor, self.patch.as_deref().unwrap_or(""));
    ResolvedRelease {
      minor: self.minor.clone(),
      release_type,
      full_version,
    }
  }
}

/// Output of [`ReleaseVersion::resolve`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRelease {
  pub minor: String,
  pub release_type: ReleaseType,
  pub full_version: String,
}

/// `("RHBA", "{minor}.{patch}")` for a patch release, `("RHEA", "{minor}.0")` otherwise
pub fn resolve(minor: &str, patch: &str) -> (ReleaseType, String) {
  if patch.is_empty() {
    (ReleaseType::Enhancement, format!("{}.0", minor))
  } else {
    (ReleaseType::BugFix, format!("{}.{}", minor, patch))
  }
}

/// Reject an empty minor version before any work starts
pub fn require_minor(minor: &str) -> ReleaseResult<()> {
  if minor.is_empty() {
    return Err(
      ValidationError::MissingParameter {
        name: "minor_version".to_string(),
      }
      .into(),
    );
  }
  Ok(())
}

/// Name of the release branch for a minor version
pub fn release_branch(minor: &str) -> String {
  format!("release-v{}.x", minor)
}
