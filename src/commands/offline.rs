//! Local-only variants of the tools: no clone, no push

use super::plans::{PlanRequest, write_release_documents};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::hack::{BranchEditor, FileOutcome};
use crate::release::version::require_minor;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Write the release documents into `output` using the configured layout
pub fn run_render(ctx: &ReleaseContext, request: &PlanRequest, output: &Path) -> ReleaseResult<String> {
  require_minor(&request.version.minor)?;
  fs::create_dir_all(output).with_context(|| format!("Failed to create output directory {}", output.display()))?;
  let summary = write_release_documents(ctx, output, request)?;

  Ok(format!(
    "Wrote {} ReleasePlanAdmission and {} ReleasePlan files under {} ({} new kustomization entries)",
    summary.admissions,
    summary.release_plans,
    output.display(),
    summary.kustomization_entries
  ))
}

/// Rewrite the `branches:` section of every repository config in `repos_dir`
pub fn run_update_branches(
  ctx: &ReleaseContext,
  minor: &str,
  upstream_versions: &BTreeMap<String, String>,
  repos_dir: &Path,
) -> ReleaseResult<String> {
  require_minor(minor)?;
  let editor = BranchEditor::new(&ctx.config, minor, upstream_versions);
  let outcomes = editor.update_dir(repos_dir)?;

  let mut text = String::new();
  for outcome in &outcomes {
    match outcome {
      FileOutcome::Updated { file, repository } => {
        let _ = writeln!(text, "Updated {} ({}) with version {}", file, repository, minor);
      }
      FileOutcome::Failed { file, reason } => {
        let _ = writeln!(text, "Skipped {}: {}", file, reason);
      }
    }
  }
  if outcomes.is_empty() {
    let _ = writeln!(text, "No repository configs found in {}", repos_dir.display());
  }
  Ok(text.trim_end().to_string())
}
