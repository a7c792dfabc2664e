//! Kustomization resource registration

use crate::core::error::{ReleaseResult, ResultExt};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Insert `  - {file}` entries right after the `resources:` line, returning
/// the new document and the number of entries added
///
/// Files already listed anywhere in the document are skipped. Without a
/// `resources:` line, one is appended together with the entries.
pub fn register_resources(kustomization: &str, file_names: &[String]) -> (String, usize) {
  let entries = unlisted(kustomization, file_names);
  (insert_entries(kustomization, &entries), entries.len())
}

/// Names from `file_names` not yet listed, without duplicates
fn unlisted<'a>(kustomization: &str, file_names: &'a [String]) -> Vec<&'a str> {
  let listed: HashSet<&str> = kustomization
    .lines()
    .filter_map(|line| line.trim().strip_prefix("- "))
    .map(str::trim)
    .collect();

  let mut seen = HashSet::new();
  file_names
    .iter()
    .map(String::as_str)
    .filter(|name| !listed.contains(name) && seen.insert(*name))
    .collect()
}

fn insert_entries(kustomization: &str, entries: &[&str]) -> String {
  if entries.is_empty() {
    return kustomization.to_string();
  }

  let mut out = String::with_capacity(kustomization.len() + entries.len() * 64);
  let mut inserted = false;
  for line in kustomization.split_inclusive('\n') {
    out.push_str(line);
    if !inserted && line.trim() == "resources:" {
      if !line.ends_with('\n') {
        out.push('\n');
      }
      push_entries(&mut out, entries);
      inserted = true;
    }
  }

  if !inserted {
    if !out.is_empty() && !out.ends_with('\n') {
      out.push('\n');
    }
    out.push_str("resources:\n");
    push_entries(&mut out, entries);
  }

  out
}

fn push_entries(out: &mut String, entries: &[&str]) {
  for entry in entries {
    out.push_str("  - ");
    out.push_str(entry);
    out.push('\n');
  }
}

/// Register `file_names` in the kustomization file at `path`
///
/// A missing file is created. Returns how many entries were added.
pub fn register_in_file(path: &Path, file_names: &[String]) -> ReleaseResult<usize> {
  let existing = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      debug!(path = %path.display(), "kustomization.yaml missing, creating it");
      String::new()
    }
    Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
  };

  let (updated, added) = register_resources(&existing, file_names);
  if added > 0 {
    fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
  }
  info!(path = %path.display(), added, "kustomization updated");
  Ok(added)
}
