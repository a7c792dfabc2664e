//! `branches:` section editor for hack repository configs
//!
//! Each file under `config/konflux/repos/` describes one repository. The YAML
//! is parsed only to learn the top-level `name` and whether `upstream` and
//! `patches` exist; the `branches:` section itself is replaced as text so the
//! rest of the file (comments, anchors, key order) stays byte-identical.
//!
//! # Section boundary
//!
//! The section starts at a column-0 `branches:` line and ends at the next blank
//! line (`\n\n` or `\r\n\r\n`). Without a following blank line it runs to end of document,
//! and the document's trailing newlines are kept. Structurally equivalent
//! spellings (indented, quoted key) are not recognized.

use crate::core::config::ReleaseConfig;
use crate::core::error::{DocumentError, ReleaseResult, ResultExt};
use crate::release::version::release_branch;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const SECTION_HEADER: &str = "branches:";

/// One entry of the `branches:` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
  pub name: String,
  pub upstream: Option<String>,
  pub versions: Vec<String>,
}

impl BranchEntry {
  /// Render the list entry with 2-space indentation, without a trailing newline
  pub fn render_block(&self, has_patches: bool) -> String {
    let mut lines = vec![format!("  - name: {}", self.name)];
    if let Some(upstream) = &self.upstream {
      lines.push(format!("    upstream: {}", upstream));
    }
    if has_patches {
      lines.push("    patches: *patches".to_string());
    }
    lines.push("    versions:".to_string());
    for version in &self.versions {
      lines.push(format!("      - \"{}\"", version));
    }
    lines.join("\n")
  }
}

/// What the editor needs to know about a repository document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFacts {
  pub name: String,
  pub has_upstream: bool,
  pub has_patches: bool,
}

/// Read top-level `name`, `upstream` and `patches` from a repository document
pub fn inspect(document: &str) -> ReleaseResult<DocumentFacts> {
  let value: Value = serde_yaml::from_str(document)?;
  let name = value
    .get("name")
    .and_then(Value::as_str)
    .ok_or(DocumentError::MissingName)?
    .to_string();

  let present = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
  Ok(DocumentFacts {
    name,
    has_upstream: present("upstream"),
    has_patches: present("patches"),
  })
}

/// Replace (or append) the `branches:` section with `block`
///
/// `block` uses `\n` line endings; they become `\r\n` when the document does.
pub fn replace_branches_section(document: &str, block: &str) -> String {
  let newline = if document.contains("\r\n") { "\r\n" } else { "\n" };
  let block = block.replace('\n', newline);

  let Some(start) = find_section_header(document) else {
    let mut out = String::with_capacity(document.len() + block.len() + 16);
    out.push_str(document);
    if !out.is_empty() && !out.ends_with('\n') {
      out.push_str(newline);
    }
    out.push_str(SECTION_HEADER);
    out.push_str(newline);
    out.push_str(&block);
    out.push_str(newline);
    return out;
  };

  let end = section_end(document, start);
  let mut out = String::with_capacity(document.len() + block.len());
  out.push_str(&document[..start]);
  out.push_str(SECTION_HEADER);
  out.push_str(newline);
  out.push_str(&block);
  out.push_str(&document[end..]);
  out
}

/// End of the section starting at `start`: the line terminator before the
/// first blank line, or the document's trailing newlines
fn section_end(document: &str, start: usize) -> usize {
  let mut offset = start;
  let mut content_end = start;
  for line in document[start..].split_inclusive('\n') {
    let content = line.trim_end_matches(['\r', '\n']);
    if content.is_empty() && offset > start {
      return content_end;
    }
    content_end = offset + content.len();
    offset += line.len();
  }
  // Runs to end of document: keep the trailing newlines
  document.trim_end_matches(['\r', '\n']).len().max(start)
}

/// Byte offset of the first column-0 line starting with `branches:`
fn find_section_header(document: &str) -> Option<usize> {
  let mut offset = 0;
  for line in document.split_inclusive('\n') {
    if line.starts_with(SECTION_HEADER) {
      return Some(offset);
    }
    offset += line.len();
  }
  None
}

/// Result of editing one file in a directory scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
  Updated { file: String, repository: String },
  Failed { file: String, reason: String },
}

/// Builds and applies branch entries for one release
pub struct BranchEditor<'a> {
  minor: &'a str,
  upstream_versions: &'a BTreeMap<String, String>,
  component_mapping: &'a BTreeMap<String, String>,
  special_components: &'a BTreeSet<String>,
}

impl<'a> BranchEditor<'a> {
  pub fn new(config: &'a ReleaseConfig, minor: &'a str, upstream_versions: &'a BTreeMap<String, String>) -> Self {
    Self {
      minor,
      upstream_versions,
      component_mapping: &config.component_mapping,
      special_components: &config.special_components,
    }
  }

  /// Branch entry for a repository
  ///
  /// - unknown repository: `release-v{minor}.x`, no upstream
  /// - special component with a supplied version: that version as the branch name
  /// - otherwise `release-v{minor}.x`, upstream only if the document declares one
  pub fn entry_for(&self, repository: &str, has_upstream: bool) -> BranchEntry {
    let versions = vec![self.minor.to_string()];
    let Some(component) = self.component_mapping.get(repository) else {
      return BranchEntry {
        name: release_branch(self.minor),
        upstream: None,
        versions,
      };
    };

    let supplied = self.upstream_versions.get(component);
    if self.special_components.contains(component)
      && let Some(version) = supplied
    {
      return BranchEntry {
        name: version.clone(),
        upstream: None,
        versions,
      };
    }

    BranchEntry {
      name: release_branch(self.minor),
      upstream: supplied.filter(|_| has_upstream).cloned(),
      versions,
    }
  }

  /// Rewrite the `branches:` section of one document
  pub fn upsert(&self, document: &str) -> ReleaseResult<(DocumentFacts, String)> {
    let facts = inspect(document)?;
    let entry = self.entry_for(&facts.name, facts.has_upstream);
    let updated = replace_branches_section(document, &entry.render_block(facts.has_patches));
    Ok((facts, updated))
  }

  /// Edit every `*.yaml` file directly under `dir`, in file name order
  ///
  /// A file that cannot be parsed or has no `name` is reported and skipped;
  /// its siblings are still edited. I/O errors abort the scan.
  pub fn update_dir(&self, dir: &Path) -> ReleaseResult<Vec<FileOutcome>> {
    let mut files: Vec<_> = fs::read_dir(dir)
      .with_context(|| format!("Failed to read repos directory {}", dir.display()))?
      .filter_map(Result::ok)
      .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
      .map(|entry| entry.path())
      .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
      .collect();
    files.sort();

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
      let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
      let content = fs::read_to_string(&path).with_context(|| format!("Failed to read file {}", file))?;

      match self.upsert(&content) {
        Ok((facts, updated)) => {
          if updated != content {
            fs::write(&path, updated).with_context(|| format!("Failed to write file {}", file))?;
          }
          info!(file = %file, repository = %facts.name, minor = %self.minor, "updated branches");
          outcomes.push(FileOutcome::Updated {
            file,
            repository: facts.name,
          });
        }
        Err(err) => {
          warn!(file = %file, error = %err, "skipping repository config");
          outcomes.push(FileOutcome::Failed {
            file,
            reason: err.to_string(),
          });
        }
      }
    }

    Ok(outcomes)
  }
}
