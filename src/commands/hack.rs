//! configure-hack-repo: register a release in the hack repository and open a PR

use crate::core::context::ReleaseContext;
use crate::core::error::{GitError, ReleaseResult, ResultExt};
use crate::core::vcs::{PullRequest, PushOptions, SystemGit, create_pull_request};
use crate::hack::{self, BranchEditor, FileOutcome};
use crate::release::version::{release_branch, require_minor};
use crate::utils::fork_owner;
use chrono::Local;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

/// Parameters of one configure-hack-repo invocation
#[derive(Debug, Clone, Default)]
pub struct HackRequest {
  pub minor: String,
  pub ocp_version: Option<String>,
  /// Component name → upstream branch or version
  pub upstream_versions: BTreeMap<String, String>,
}

/// Edits made to a hack checkout
#[derive(Debug, Clone)]
pub struct HackChanges {
  /// Files under `config/konflux/` where `next` was replaced
  pub konflux_files: Vec<String>,
  /// Per-file results of the branch-section edit
  pub outcomes: Vec<FileOutcome>,
}

impl HackChanges {
  pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
    self.outcomes.iter().filter_map(|o| match o {
      FileOutcome::Failed { file, reason } => Some((file.as_str(), reason.as_str())),
      FileOutcome::Updated { .. } => None,
    })
  }

  pub fn updated(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|o| matches!(o, FileOutcome::Updated { .. }))
      .count()
  }
}

/// Bump konflux configs and rewrite the branch sections of a hack checkout
pub fn apply_hack_changes(ctx: &ReleaseContext, checkout: &Path, request: &HackRequest) -> ReleaseResult<HackChanges> {
  let konflux_files = hack::bump_konflux_configs(&hack::konflux_dir(checkout), &request.minor)
    .context("failed to update Konflux configurations")?;

  if let Some(ocp) = &request.ocp_version {
    info!(
      ocp = %ocp,
      file = %hack::ocp_index_file(ocp),
      "new OCP version: add the index config by hand, following an existing openshift-pipelines-index-*.yaml"
    );
  }

  let editor = BranchEditor::new(&ctx.config, &request.minor, &request.upstream_versions);
  let outcomes = editor
    .update_dir(&hack::repos_dir(checkout))
    .context("failed to update repository branch configurations")?;

  Ok(HackChanges {
    konflux_files,
    outcomes,
  })
}

/// Body of the hack pull request
pub fn pull_request_body(request: &HackRequest) -> String {
  let ocp_note = request
    .ocp_version
    .as_ref()
    .map(|ocp| format!("- Added new OCP {} configuration", ocp))
    .unwrap_or_default();

  format!(
    "Update Konflux configuration for release v{minor}\n\nChanges:\n- Updated version references for release v{minor}\n- Updated branch configurations in repos directory\n{ocp_note}",
    minor = request.minor,
    ocp_note = ocp_note,
  )
}

/// Run the configure-hack-repo workflow, returning the result text with the PR URL
pub fn run_configure_hack_repo(ctx: &ReleaseContext, request: &HackRequest) -> ReleaseResult<String> {
  require_minor(&request.minor)?;
  let scratch = ctx.scratch_dir("hack-repo-")?;
  let checkout = scratch.path().join("hack");
  let base = release_branch(&request.minor);

  info!(url = %ctx.config.hack.url, branch = %base, "cloning hack repository");
  let git = SystemGit::clone_repo(&ctx.config.hack.url, &checkout, Some(&base))
    .context("failed to clone hack repository")?;

  let pr_branch = format!("update-konflux-config-{}", Local::now().format("%Y%m%d%H%M%S"));
  git.create_branch(&pr_branch).context("failed to create PR branch")?;

  let changes = apply_hack_changes(ctx, &checkout, request)?;
  for (file, reason) in changes.failures() {
    warn!(%file, %reason, "repository config left unchanged");
  }

  let pr_url = open_pull_request(ctx, &git, request, &base).context("failed to create and push PR")?;
  info!(url = %pr_url, "hack pull request created");

  Ok(summarize(&pr_url, &changes, request))
}

fn open_pull_request(ctx: &ReleaseContext, git: &SystemGit, request: &HackRequest, base: &str) -> ReleaseResult<String> {
  git.add_all()?;
  git.commit(&format!("Update Konflux configuration for release v{}", request.minor))?;

  let branch = git.current_branch()?;
  git.push(
    "origin",
    &branch,
    &PushOptions {
      force: true,
      ..PushOptions::default()
    },
  )?;

  let remote_url = git.remote_url("origin")?;
  let owner = fork_owner(&remote_url).ok_or_else(|| GitError::UnknownOwner {
    remote_url: remote_url.clone(),
  })?;

  let pr = PullRequest {
    title: format!("Update Konflux configuration for release v{}", request.minor),
    body: pull_request_body(request),
    repo: ctx.config.hack.upstream_repo.clone(),
    head: format!("{}:{}", owner, branch),
    base: base.to_string(),
  };
  create_pull_request(git.work_tree(), &pr)
}

/// Result text reported back to the caller
pub fn summarize(pr_url: &str, changes: &HackChanges, request: &HackRequest) -> String {
  let mut text = format!("Successfully configured hack repository and created pull request: {}", pr_url);
  let _ = write!(
    text,
    "\nUpdated {} konflux config file(s) and {} repository config(s)",
    changes.konflux_files.len(),
    changes.updated()
  );

  let failures: Vec<_> = changes.failures().collect();
  if !failures.is_empty() {
    text.push_str("\nSkipped repository configs:");
    for (file, reason) in failures {
      let _ = write!(text, "\n- {}: {}", file, reason);
    }
  }

  if let Some(ocp) = &request.ocp_version {
    let _ = write!(
      text,
      "\nNote: to add support for OCP {}, create config/konflux/{} following an existing openshift-pipelines-index-*.yaml",
      ocp,
      hack::ocp_index_file(ocp)
    );
  }
  text
}
