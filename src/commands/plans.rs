//! create-release-plans: generate ReleasePlan / ReleasePlanAdmission documents
//! in the release data repository and push them as a merge request

use crate::core::context::{GitlabCredentials, ReleaseContext};
use crate::core::error::{GitError, ReleaseResult, ResultExt};
use crate::core::vcs::{PushOptions, SystemGit};
use crate::release::version::require_minor;
use crate::release::{self, ReleaseVersion, WriteSummary};
use crate::utils::redact_credentials;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Parameters of one create-release-plans invocation
#[derive(Debug, Clone)]
pub struct PlanRequest {
  pub version: ReleaseVersion,
  /// Empty means the configured defaults
  pub ocp_versions: Vec<String>,
}

impl PlanRequest {
  pub fn new(minor: impl Into<String>, patch: Option<String>, ocp_versions: Vec<String>) -> Self {
    Self {
      version: ReleaseVersion::new(minor, patch),
      ocp_versions,
    }
  }

  fn ocp_versions<'a>(&'a self, defaults: &'a [String]) -> &'a [String] {
    if self.ocp_versions.is_empty() {
      defaults
    } else {
      &self.ocp_versions
    }
  }
}

/// Render every document into `checkout` and register the plans
///
/// Rendering finishes before the first write, so a template error leaves the
/// checkout untouched.
pub fn write_release_documents(ctx: &ReleaseContext, checkout: &Path, request: &PlanRequest) -> ReleaseResult<WriteSummary> {
  require_minor(&request.version.minor)?;
  let ocp_versions = request.ocp_versions(&ctx.config.default_ocp_versions);
  let generated = release::generate(&ctx.config, &request.version, ocp_versions)?;
  generated.write(checkout, &ctx.config.konflux)
}

/// Run the manifest build script with the checkout as working directory
pub fn run_build_manifests(checkout: &Path, script: &Path) -> ReleaseResult<()> {
  let command = script.display().to_string();
  info!(script = %command, "running manifest build");

  let output = Command::new(checkout.join(script))
    .current_dir(checkout)
    .output()
    .with_context(|| format!("Failed to execute {}", command))?;

  debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim_end(), "manifest build output");
  if !output.status.success() {
    return Err(
      GitError::CommandFailed {
        command,
        stderr: redact_credentials(String::from_utf8_lossy(&output.stderr).trim_end()),
      }
      .into(),
    );
  }
  Ok(())
}

/// Run the create-release-plans workflow
pub fn run_create_release_plans(ctx: &ReleaseContext, request: &PlanRequest) -> ReleaseResult<String> {
  require_minor(&request.version.minor)?;
  let credentials = GitlabCredentials::from_env()?;
  let konflux = &ctx.config.konflux;
  let minor = &request.version.minor;
  let remote = konflux.authenticated_url(&credentials.username, &credentials.token);

  let scratch = ctx.scratch_dir("konflux-release-data-")?;
  let checkout = scratch.path().join("konflux-release-data");

  info!(host = %konflux.host, path = %konflux.path, "cloning release data repository");
  let git = SystemGit::clone_repo(&remote, &checkout, None).context("failed to clone konflux-release-data repository")?;
  git
    .create_branch(&format!("add-release-plans-{}", minor))
    .context("failed to create branch")?;

  let summary = write_release_documents(ctx, &checkout, request).context("failed to create release documents")?;
  run_build_manifests(&checkout, &konflux.build_script).context("failed to run build-manifests.sh")?;

  let mr_branch = format!("release-plan-v{}", minor);
  push_merge_request(&git, &remote, &mr_branch, request, &konflux.target_branch)
    .context("failed to create and push merge request")?;

  info!(branch = %mr_branch, target = %konflux.target_branch, "release plans pushed");
  Ok(format!(
    "Successfully created ReleasePlan and ReleasePlanAdmission files ({} admissions, {} release plans) and pushed branch '{}' with a merge request against '{}'",
    summary.admissions, summary.release_plans, mr_branch, konflux.target_branch
  ))
}

fn push_merge_request(
  git: &SystemGit,
  remote: &str,
  branch: &str,
  request: &PlanRequest,
  target_branch: &str,
) -> ReleaseResult<()> {
  let title = format!("Add ReleasePlan and ReleasePlanAdmission for v{}", request.version.minor);
  git.add_all()?;
  git.commit(&title)?;
  git.create_branch(branch)?;
  git.push(
    remote,
    branch,
    &PushOptions {
      set_upstream: true,
      server_options: merge_request_options(&title, target_branch),
      ..PushOptions::default()
    },
  )
}

/// GitLab push options that open a merge request for the pushed branch
pub fn merge_request_options(title: &str, target_branch: &str) -> Vec<String> {
  vec![
    "merge_request.create".to_string(),
    format!("merge_request.target={}", target_branch),
    format!("merge_request.title={}", title),
  ]
}
