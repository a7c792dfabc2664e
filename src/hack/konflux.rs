//! Version bump for `config/konflux/*.yaml`

use crate::core::error::{ReleaseResult, ResultExt};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Placeholder used on the development branch
const DEVELOPMENT_VERSION: &str = "next";

/// Replace every `next` with `minor` in the `*.yaml` files directly under `dir`
///
/// Returns the names of the files that changed, sorted.
pub fn bump_konflux_configs(dir: &Path, minor: &str) -> ReleaseResult<Vec<String>> {
  let mut files: Vec<_> = fs::read_dir(dir)
    .with_context(|| format!("Failed to read konflux directory {}", dir.display()))?
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
    .map(|entry| entry.path())
    .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
    .collect();
  files.sort();

  let mut changed = Vec::new();
  for path in files {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read file {}", name))?;
    if !content.contains(DEVELOPMENT_VERSION) {
      continue;
    }
    fs::write(&path, content.replace(DEVELOPMENT_VERSION, minor))
      .with_context(|| format!("Failed to write file {}", name))?;
    debug!(file = %name, %minor, "bumped konflux config");
    changed.push(name);
  }

  info!(files = changed.len(), %minor, "konflux configs updated");
  Ok(changed)
}

/// Index config a maintainer must add by hand for a new OCP version
pub fn ocp_index_file(ocp_version: &str) -> String {
  format!("openshift-pipelines-index-{}.yaml", ocp_version)
}
