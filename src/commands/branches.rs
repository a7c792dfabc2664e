//! create-release-branches: cut `release-v{minor}.x` in every component repository

use crate::core::config::RepositoryConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::vcs::{PushOptions, SystemGit};
use crate::release::version::{release_branch, require_minor};
use std::path::Path;
use tracing::info;

/// Run the create-release-branches workflow
///
/// Repositories are processed in table order; the first failure aborts the
/// rest. Branches already pushed are left in place.
pub fn run_create_release_branches(ctx: &ReleaseContext, minor: &str) -> ReleaseResult<String> {
  require_minor(minor)?;
  let scratch = ctx.scratch_dir("release-branches-")?;
  let branch = release_branch(minor);

  let mut created = 0;
  for repo in ctx.config.branch_targets() {
    cut_branch(scratch.path(), repo, &branch).with_context(|| format!("failed to create branch for {}", repo.name))?;
    created += 1;
  }

  info!(%branch, repositories = created, "release branches created");
  Ok(format!("Successfully created release branches for version {}", minor))
}

fn cut_branch(scratch: &Path, repo: &RepositoryConfig, branch: &str) -> ReleaseResult<()> {
  let url = repo.url.as_deref().unwrap_or_default();
  info!(repo = %repo.name, source = %repo.source_branch, %branch, "cutting release branch");

  let git = SystemGit::clone_repo(url, &scratch.join(&repo.name), None)?;
  git.fetch_all()?;
  git.checkout(&repo.source_branch)?;
  git.pull("origin", &repo.source_branch)?;
  git.create_branch(branch)?;
  git.push("origin", branch, &PushOptions::default())?;
  Ok(())
}
