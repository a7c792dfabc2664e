//! Hack repository edits: konflux version bump and per-repository branch sections

pub mod branches;
pub mod konflux;

pub use branches::{BranchEditor, FileOutcome};
pub use konflux::{bump_konflux_configs, ocp_index_file};

use std::path::{Path, PathBuf};

/// `config/konflux` inside a hack checkout
pub fn konflux_dir(checkout: &Path) -> PathBuf {
  checkout.join("config").join("konflux")
}

/// `config/konflux/repos` inside a hack checkout
pub fn repos_dir(checkout: &Path) -> PathBuf {
  konflux_dir(checkout).join("repos")
}
