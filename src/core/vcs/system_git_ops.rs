//! Branch, commit and push operations for SystemGit

use super::system_git::SystemGit;
use crate::core::error::{GitError, ReleaseError, ReleaseResult};
use crate::utils::redact_credentials;

/// Options for [`SystemGit::push`]
#[derive(Debug, Default, Clone)]
pub struct PushOptions {
  /// `--force`
  pub force: bool,
  /// `--set-upstream`
  pub set_upstream: bool,
  /// Server-side push options (`-o key=value`)
  pub server_options: Vec<String>,
}

impl SystemGit {
  /// Fetch every remote
  pub fn fetch_all(&self) -> ReleaseResult<()> {
    self.run(&["fetch", "--all"]).map(|_| ())
  }

  /// Check out an existing branch
  pub fn checkout(&self, branch: &str) -> ReleaseResult<()> {
    self.run(&["checkout", branch]).map(|_| ())
  }

  /// Fast-forward the current branch from `remote/branch`
  pub fn pull(&self, remote: &str, branch: &str) -> ReleaseResult<()> {
    self.run(&["pull", "--ff-only", remote, branch]).map(|_| ())
  }

  /// Create and check out a new branch from HEAD
  pub fn create_branch(&self, name: &str) -> ReleaseResult<()> {
    self.run(&["checkout", "-b", name]).map(|_| ())
  }

  /// Stage every change in the working tree
  pub fn add_all(&self) -> ReleaseResult<()> {
    self.run(&["add", "."]).map(|_| ())
  }

  /// Commit staged changes
  pub fn commit(&self, message: &str) -> ReleaseResult<()> {
    self.run(&["commit", "-m", message]).map(|_| ())
  }

  /// Get current branch name
  pub fn current_branch(&self) -> ReleaseResult<String> {
    self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
  }

  /// URL configured for a remote
  pub fn remote_url(&self, remote: &str) -> ReleaseResult<String> {
    let key = format!("remote.{}.url", remote);
    self.run(&["config", "--get", &key])
  }

  /// Push `branch` to `remote` (a remote name or URL)
  pub fn push(&self, remote: &str, branch: &str, options: &PushOptions) -> ReleaseResult<()> {
    let mut args = vec!["push"];
    if options.force {
      args.push("-f");
    }
    if options.set_upstream {
      args.push("-u");
    }
    for opt in &options.server_options {
      args.push("-o");
      args.push(opt);
    }
    args.push(remote);
    args.push(branch);

    self.run(&args).map(|_| ()).map_err(|err| match err {
      ReleaseError::Git(GitError::CommandFailed { stderr, .. }) => GitError::PushFailed {
        remote: redact_credentials(remote),
        branch: branch.to_string(),
        reason: stderr,
      }
      .into(),
      other => other,
    })
  }
}
