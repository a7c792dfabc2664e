//! Static release tables, injected at startup
//!
//! Every table the tools consult (repositories to branch, repository to component
//! names, component groups for release plans, remote locations) lives in
//! [`ReleaseConfig`]. Built-in defaults describe the OpenShift Pipelines release;
//! a `release-mcp.toml` file may override any table.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::release::matrix::{ComponentGroup, SubComponent};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for release-mcp
/// Searched in order: --config, $RELEASE_MCP_CONFIG, release-mcp.toml, .config/release-mcp.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Repositories that receive a release branch, in processing order
  #[serde(default = "default_repositories")]
  pub repositories: Vec<RepositoryConfig>,

  /// Hack repository `name` field -> logical component name
  #[serde(default = "default_component_mapping")]
  pub component_mapping: BTreeMap<String, String>,

  /// Components whose release branch is named after their upstream version
  #[serde(default = "default_special_components")]
  pub special_components: BTreeSet<String>,

  /// Component groups for release plans, in generation order
  #[serde(default = "default_component_groups")]
  pub component_groups: Vec<ComponentGroup>,

  /// OCP versions used when a caller supplies none
  #[serde(default = "default_ocp_versions")]
  pub default_ocp_versions: Vec<String>,

  #[serde(default)]
  pub hack: HackRepoConfig,

  #[serde(default)]
  pub konflux: KonfluxRepoConfig,
}

/// A repository that gets a `release-v{minor}.x` branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
  pub name: String,

  /// Branch the release branch is cut from
  #[serde(default = "default_source_branch")]
  pub source_branch: String,

  /// Clone URL (required unless skipped)
  #[serde(default)]
  pub url: Option<String>,

  /// Listed for completeness but never branched
  #[serde(default)]
  pub skip: bool,
}

/// Where the hack repository lives and where pull requests go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackRepoConfig {
  /// Clone URL (usually the maintainer's fork)
  #[serde(default = "default_hack_url")]
  pub url: String,

  /// `owner/repo` that receives the pull request
  #[serde(default = "default_hack_upstream")]
  pub upstream_repo: String,
}

impl Default for HackRepoConfig {
  fn default() -> Self {
    Self {
      url: default_hack_url(),
      upstream_repo: default_hack_upstream(),
    }
  }
}

/// Konflux release data repository layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KonfluxRepoConfig {
  /// GitLab host, credentials are added at clone time
  #[serde(default = "default_konflux_host")]
  pub host: String,

  /// Project path on the host, without `.git`
  #[serde(default = "default_konflux_path")]
  pub path: String,

  /// Branch the merge request targets
  #[serde(default = "default_konflux_target")]
  pub target_branch: String,

  /// ReleasePlanAdmission directory, relative to the checkout
  #[serde(default = "default_admission_dir")]
  pub admission_dir: PathBuf,

  /// ReleasePlan directory (holds kustomization.yaml), relative to the checkout
  #[serde(default = "default_release_plan_dir")]
  pub release_plan_dir: PathBuf,

  /// Manifest build script, relative to the checkout
  #[serde(default = "default_build_script")]
  pub build_script: PathBuf,
}

impl Default for KonfluxRepoConfig {
  fn default() -> Self {
    Self {
      host: default_konflux_host(),
      path: default_konflux_path(),
      target_branch: default_konflux_target(),
      admission_dir: default_admission_dir(),
      release_plan_dir: default_release_plan_dir(),
      build_script: default_build_script(),
    }
  }
}

impl KonfluxRepoConfig {
  /// Clone URL with embedded credentials
  pub fn authenticated_url(&self, username: &str, token: &str) -> String {
    format!("https://{}:{}@{}/{}.git", username, token, self.host, self.path)
  }
}

fn default_source_branch() -> String {
  "next".to_string()
}

fn default_hack_url() -> String {
  "git@github.com:openshift-pipelines/hack.git".to_string()
}

fn default_hack_upstream() -> String {
  "openshift-pipelines/hack".to_string()
}

fn default_konflux_host() -> String {
  "gitlab.cee.redhat.com".to_string()
}

fn default_konflux_path() -> String {
  "sashture/konflux-release-data".to_string()
}

fn default_konflux_target() -> String {
  "main".to_string()
}

fn default_admission_dir() -> PathBuf {
  ["config", "kflux-prd-rh02.0fk9.p1", "product", "ReleasePlanAdmission", "tekton-ecosystem"]
    .iter()
    .collect()
}

fn default_release_plan_dir() -> PathBuf {
  ["tenants-config", "cluster", "kflux-prd-rh02", "tenants", "tekton-ecosystem-tenant"]
    .iter()
    .collect()
}

fn default_build_script() -> PathBuf {
  ["tenants-config", "build-manifests.sh"].iter().collect()
}

fn default_repositories() -> Vec<RepositoryConfig> {
  let branched = [
    ("pipeline", "tektoncd-pipeline.git"),
    ("triggers", "tektoncd-triggers.git"),
    ("chains", "tektoncd-chains.git"),
    ("results", "tektoncd-results.git"),
    ("cli", "tektoncd-cli.git"),
    ("hub", "tektoncd-hub.git"),
    ("pac", "pac-downstream.git"),
    ("cache", "tekton-caches.git"),
    ("git-init", "tektoncd-git-clone.git"),
    ("operator", "operator.git"),
    ("hack", "hack.git"),
  ];
  let skipped = ["manual-approval-gate", "opc", "console-plugin", "tektoncd-pruner", "tekton-caches"];

  branched
    .iter()
    .map(|(name, repo)| RepositoryConfig {
      name: name.to_string(),
      source_branch: default_source_branch(),
      url: Some(format!("git@github.com:openshift-pipelines/{}", repo)),
      skip: false,
    })
    .chain(skipped.iter().map(|name| RepositoryConfig {
      name: name.to_string(),
      source_branch: default_source_branch(),
      url: None,
      skip: true,
    }))
    .collect()
}

fn default_component_mapping() -> BTreeMap<String, String> {
  [
    ("tektoncd-pipeline", "pipeline"),
    ("tektoncd-chains", "chains"),
    ("tektoncd-git-clone", "git-init"),
    ("operator", "operator"),
    ("pac-downstream", "pac"),
    ("tektoncd-cli", "cli"),
    ("tektoncd-hub", "hub"),
    ("tektoncd-results", "results"),
    ("tektoncd-triggers", "triggers"),
    ("manual-approval-gate", "manual-approval-gate"),
    ("tekton-caches", "cache"),
    ("tektoncd-pruner", "pruner"),
  ]
  .iter()
  .map(|(repo, component)| (repo.to_string(), component.to_string()))
  .collect()
}

fn default_special_components() -> BTreeSet<String> {
  ["manual-approval-gate", "cache", "pruner"]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_component_groups() -> Vec<ComponentGroup> {
  let group = |name: &str, subs: &[(&str, &str)]| {
    ComponentGroup::new(
      name,
      subs
        .iter()
        .map(|(sub, repository)| SubComponent {
          name: sub.to_string(),
          repository: repository.to_string(),
        })
        .collect(),
    )
  };

  vec![
    group("cli", &[("tkn", "pipelines-cli-tkn-rhel9")]),
    group(
      "core",
      &[
        ("controller", "pipelines-core-controller-rhel9"),
        ("webhook", "pipelines-core-webhook-rhel9"),
      ],
    ),
    group(
      "operator",
      &[
        ("operator", "pipelines-rhel9-operator"),
        ("proxy", "pipelines-operator-proxy-rhel9"),
        ("webhook", "pipelines-operator-webhook-rhel9"),
      ],
    ),
    group("fbc", &[]),
  ]
}

fn default_ocp_versions() -> Vec<String> {
  ["4-15", "4-16", "4-17", "4-18", "4-19"]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      repositories: default_repositories(),
      component_mapping: default_component_mapping(),
      special_components: default_special_components(),
      component_groups: default_component_groups(),
      default_ocp_versions: default_ocp_versions(),
      hack: HackRepoConfig::default(),
      konflux: KonfluxRepoConfig::default(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release-mcp.toml, .config/release-mcp.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("release-mcp.toml"),
      path.join(".config").join("release-mcp.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load configuration
  ///
  /// An explicit path must exist. Without one, the search locations under `cwd`
  /// are tried and the built-in tables are used when none is present.
  pub fn load(explicit: Option<&Path>, cwd: &Path) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) if !path.exists() => {
        return Err(ReleaseError::Config(ConfigError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(cwd) {
        Some(path) => path,
        None => {
          debug!("no release-mcp.toml found, using built-in release tables");
          return Ok(Self::default());
        }
      },
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    debug!(path = %config_path.display(), "loaded release configuration");
    Ok(config)
  }

  /// Parse and validate configuration text
  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Check table consistency
  pub fn validate(&self) -> ReleaseResult<()> {
    let mut seen = HashSet::new();
    for repo in &self.repositories {
      if repo.name.is_empty() {
        return Err(ConfigError::MissingField {
          field: "repositories.name".to_string(),
        }
        .into());
      }
      if !seen.insert(repo.name.as_str()) {
        return Err(ConfigError::Duplicate {
          kind: "repository".to_string(),
          name: repo.name.clone(),
        }
        .into());
      }
      if !repo.skip && repo.url.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::MissingField {
          field: format!("url for repository '{}'", repo.name),
        }
        .into());
      }
    }

    let mut groups = HashSet::new();
    for group in &self.component_groups {
      if group.name.is_empty() {
        return Err(ConfigError::MissingField {
          field: "component_groups.name".to_string(),
        }
        .into());
      }
      if !groups.insert(group.name.as_str()) {
        return Err(ConfigError::Duplicate {
          kind: "component group".to_string(),
          name: group.name.clone(),
        }
        .into());
      }
    }

    if self.default_ocp_versions.is_empty() {
      return Err(ConfigError::MissingField {
        field: "default_ocp_versions".to_string(),
      }
      .into());
    }

    Ok(())
  }

  /// Repositories that receive a release branch
  pub fn branch_targets(&self) -> impl Iterator<Item = &RepositoryConfig> {
    self.repositories.iter().filter(|r| !r.skip)
  }
}
