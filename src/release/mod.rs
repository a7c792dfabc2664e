//! ReleasePlan / ReleasePlanAdmission generation
//!
//! # Pipeline
//!
//! ```text
//! ReleaseVersion ──resolve──▶ ResolvedRelease
//!                                   │
//! component_groups × environments ──expand──▶ [GenerationTask] ──render──▶ [RenderedDocuments]
//!                                                                               │
//!                                                         write + register in kustomization.yaml
//! ```
//!
//! Every document is rendered in memory before the first file is written, so a
//! template failure leaves the target tree untouched.

pub mod kustomize;
pub mod matrix;
pub mod render;
pub mod version;

pub use matrix::Environment;
pub use render::{Document, RenderedDocuments, Renderer};
pub use version::{ReleaseVersion, ResolvedRelease};

use crate::core::config::{KonfluxRepoConfig, ReleaseConfig};
use crate::core::error::{ReleaseResult, ResultExt};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Rendered documents for one release, not yet on disk
#[derive(Debug, Clone)]
pub struct GeneratedRelease {
  pub release: ResolvedRelease,
  pub documents: Vec<RenderedDocuments>,
}

/// Counts reported after [`GeneratedRelease::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
  pub admissions: usize,
  pub release_plans: usize,
  pub kustomization_entries: usize,
}

/// Expand and render every document for `version`
pub fn generate(config: &ReleaseConfig, version: &ReleaseVersion, ocp_versions: &[String]) -> ReleaseResult<GeneratedRelease> {
  let release = version.resolve();
  let tasks = matrix::expand(&config.component_groups, &Environment::ALL, ocp_versions);
  let (admissions, plans) = matrix::document_counts(&tasks);
  debug!(
    minor = %release.minor,
    full_version = %release.full_version,
    release_type = %release.release_type,
    admissions,
    plans,
    "expanded generation matrix"
  );

  let documents = Renderer::new()?.render_all(&tasks, &release)?;
  Ok(GeneratedRelease { release, documents })
}

impl GeneratedRelease {
  /// File names of the ReleasePlans, in generation order
  pub fn release_plan_files(&self) -> Vec<String> {
    self
      .documents
      .iter()
      .filter_map(|d| d.release_plan.as_ref())
      .map(|d| d.file_name.clone())
      .collect()
  }

  /// Write all documents below `root` and register the plans in kustomization.yaml
  pub fn write(&self, root: &Path, layout: &KonfluxRepoConfig) -> ReleaseResult<WriteSummary> {
    let admission_dir = root.join(&layout.admission_dir);
    let plan_dir = root.join(&layout.release_plan_dir);
    fs::create_dir_all(&admission_dir)
      .with_context(|| format!("Failed to create RPA directory {}", admission_dir.display()))?;
    fs::create_dir_all(&plan_dir).with_context(|| format!("Failed to create RP directory {}", plan_dir.display()))?;

    let mut summary = WriteSummary {
      admissions: 0,
      release_plans: 0,
      kustomization_entries: 0,
    };

    for rendered in &self.documents {
      write_document(&admission_dir, &rendered.admission)?;
      summary.admissions += 1;
      if let Some(plan) = &rendered.release_plan {
        write_document(&plan_dir, plan)?;
        summary.release_plans += 1;
      }
    }

    summary.kustomization_entries =
      kustomize::register_in_file(&plan_dir.join("kustomization.yaml"), &self.release_plan_files())?;

    info!(
      version = %self.release.full_version,
      admissions = summary.admissions,
      release_plans = summary.release_plans,
      "release documents written"
    );
    Ok(summary)
  }
}

fn write_document(dir: &Path, document: &Document) -> ReleaseResult<()> {
  let path = dir.join(&document.file_name);
  fs::write(&path, &document.content).with_context(|| format!("Failed to write {}", document.file_name))?;
  debug!(file = %document.file_name, "wrote document");
  Ok(())
}
