//! Pull request creation via the GitHub CLI

use crate::core::error::{GitError, ReleaseResult, ResultExt};
use crate::utils::redact_credentials;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Everything `gh pr create` needs
#[derive(Debug, Clone)]
pub struct PullRequest {
  pub title: String,
  pub body: String,
  /// `owner/repo` receiving the pull request
  pub repo: String,
  /// `owner:branch` of the pushed changes
  pub head: String,
  pub base: String,
}

/// Open a pull request, returning its URL
///
/// Runs inside `work_tree` so gh can resolve the local repository.
pub fn create_pull_request(work_tree: &Path, pr: &PullRequest) -> ReleaseResult<String> {
  let output = Command::new("gh")
    .current_dir(work_tree)
    .args(["pr", "create"])
    .args(["--title", &pr.title])
    .args(["--body", &pr.body])
    .args(["--repo", &pr.repo])
    .args(["--head", &pr.head])
    .args(["--base", &pr.base])
    .output()
    .context("Failed to execute gh pr create")?;

  if !output.status.success() {
    return Err(
      GitError::PullRequestFailed {
        repo: pr.repo.clone(),
        reason: redact_credentials(&String::from_utf8_lossy(&output.stderr)),
      }
      .into(),
    );
  }

  // gh prints the PR URL on stdout
  let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
  info!(repo = %pr.repo, %url, "pull request created");
  Ok(url)
}
