//! Component matrix expansion
//!
//! Turns the component group table, the target environments and the OCP
//! versions into an ordered list of [`GenerationTask`]s. Every task yields one
//! ReleasePlanAdmission; non-FBC tasks also yield one ReleasePlan.

use crate::core::error::{ReleaseError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the sentinel group released as a file-based catalog
pub const FBC_GROUP: &str = "fbc";

/// Package allowed into the operator index
const FBC_ALLOWED_PACKAGE: &str = "openshift-pipelines-operator-rh";

/// A released image inside a component group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubComponent {
  /// Short name used in the mapping entry (e.g. `controller`)
  pub name: String,
  /// Image repository under `openshift-pipelines/`
  pub repository: String,
}

/// A component group (cli, core, operator, fbc)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentGroup {
  pub name: String,
  #[serde(default)]
  pub sub_components: Vec<SubComponent>,
}

impl ComponentGroup {
  pub fn new(name: impl Into<String>, sub_components: Vec<SubComponent>) -> Self {
    Self {
      name: name.into(),
      sub_components,
    }
  }

  pub fn is_fbc(&self) -> bool {
    self.name == FBC_GROUP
  }
}

/// Release environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  Stage,
  Prod,
}

impl Environment {
  /// Both environments, stage first
  pub const ALL: [Environment; 2] = [Environment::Stage, Environment::Prod];

  pub fn as_str(self) -> &'static str {
    match self {
      Environment::Stage => "stage",
      Environment::Prod => "prod",
    }
  }

  /// Registry, policy and pipeline identity for this environment
  pub fn profile(self, is_fbc: bool) -> EnvironmentProfile {
    match (self, is_fbc) {
      (Environment::Stage, false) => EnvironmentProfile {
        registry_host: "registry.stage.redhat.io",
        policy_name: "registry-standard-stage",
        intention_label: "staging",
        service_account: "release-registry-staging",
        business_unit: "application-developer",
      },
      (Environment::Prod, false) => EnvironmentProfile {
        registry_host: "registry.redhat.io",
        policy_name: "registry-standard",
        intention_label: "production",
        service_account: "release-registry-prod",
        business_unit: "application-developer",
      },
      (Environment::Stage, true) => EnvironmentProfile {
        registry_host: "registry.stage.redhat.io",
        policy_name: "fbc-tekton-ecosystem-stage",
        intention_label: "staging",
        service_account: "release-index-image-staging",
        business_unit: "hybrid-platforms",
      },
      (Environment::Prod, true) => EnvironmentProfile {
        registry_host: "registry.redhat.io",
        policy_name: "fbc-tekton-ecosystem-prod",
        intention_label: "production",
        service_account: "release-index-image-prod",
        business_unit: "hybrid-platforms",
      },
    }
  }

  /// Index image settings for the FBC admission
  pub fn fbc_profile(self) -> FbcProfile {
    match self {
      Environment::Stage => FbcProfile {
        staged_index: Some(true),
        from_index: "registry-proxy.engineering.redhat.com/rh-osbs/iib-pub-pending:{{ OCP_VERSION }}",
        target_index: "",
        publishing_credentials: "staged-index-fbc-publishing-credentials",
        request_timeout_seconds: 1500,
        build_timeout_seconds: 1500,
        allowed_packages: vec![FBC_ALLOWED_PACKAGE],
      },
      Environment::Prod => FbcProfile {
        staged_index: None,
        from_index: "registry-proxy.engineering.redhat.com/rh-osbs/iib-pub:{{ OCP_VERSION }}",
        target_index: "quay.io/redhat-prod/redhat----redhat-operator-index:{{ OCP_VERSION }}",
        publishing_credentials: "fbc-production-publishing-credentials-redhat-prod",
        request_timeout_seconds: 1500,
        build_timeout_seconds: 1500,
        allowed_packages: vec![FBC_ALLOWED_PACKAGE],
      },
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Environment {
  type Err = ReleaseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "stage" => Ok(Environment::Stage),
      "prod" => Ok(Environment::Prod),
      other => Err(
        ValidationError::InvalidValue {
          field: "environment".to_string(),
          reason: format!("unknown environment '{}' (expected 'stage' or 'prod')", other),
        }
        .into(),
      ),
    }
  }
}

/// Per-environment values substituted into the admission and plan templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentProfile {
  pub registry_host: &'static str,
  pub policy_name: &'static str,
  pub intention_label: &'static str,
  pub service_account: &'static str,
  pub business_unit: &'static str,
}

/// `data.fbc` settings of an FBC admission
///
/// `{{ OCP_VERSION }}` in the index references is resolved by the release
/// pipeline, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FbcProfile {
  pub staged_index: Option<bool>,
  pub from_index: &'static str,
  pub target_index: &'static str,
  pub publishing_credentials: &'static str,
  pub request_timeout_seconds: u32,
  pub build_timeout_seconds: u32,
  pub allowed_packages: Vec<&'static str>,
}

/// One scalar `key: value` line of the `data.fbc` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FbcSetting {
  pub key: &'static str,
  pub value: String,
}

impl FbcProfile {
  /// Scalar settings in key order; `allowedPackages` is rendered separately as a list
  pub fn settings(&self) -> Vec<FbcSetting> {
    let mut settings = vec![
      FbcSetting {
        key: "buildTimeoutSeconds",
        value: self.build_timeout_seconds.to_string(),
      },
      FbcSetting {
        key: "fromIndex",
        value: self.from_index.to_string(),
      },
      FbcSetting {
        key: "publishingCredentials",
        value: self.publishing_credentials.to_string(),
      },
      FbcSetting {
        key: "requestTimeoutSeconds",
        value: self.request_timeout_seconds.to_string(),
      },
    ];
    if let Some(staged) = self.staged_index {
      settings.push(FbcSetting {
        key: "stagedIndex",
        value: staged.to_string(),
      });
    }
    settings.push(FbcSetting {
      key: "targetIndex",
      value: self.target_index.to_string(),
    });
    settings
  }
}

/// Everything needed to render the documents of one (group, environment) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
  pub group: String,
  pub is_fbc: bool,
  pub environment: Environment,
  pub profile: EnvironmentProfile,
  pub sub_components: Vec<SubComponent>,
  /// Only populated for the FBC group
  pub ocp_versions: Vec<String>,
}

impl GenerationTask {
  /// File name of the ReleasePlanAdmission
  pub fn admission_file_name(&self, minor: &str) -> String {
    if self.is_fbc {
      format!("openshift-pipelines-{}-fbc-{}.yaml", minor, self.environment)
    } else {
      format!("openshift-pipelines-{}-{}-{}.yaml", self.group, minor, self.environment)
    }
  }

  /// File name of the ReleasePlan, `None` for the FBC group
  pub fn release_plan_file_name(&self, minor: &str) -> Option<String> {
    (!self.is_fbc).then(|| format!("openshift-pipelines-{}-{}-{}-release-as-op.yaml", self.group, minor, self.environment))
  }
}

/// Expand groups × environments into generation tasks
///
/// Groups are the outer loop in table order, environments the inner loop in
/// caller order.
pub fn expand(groups: &[ComponentGroup], environments: &[Environment], ocp_versions: &[String]) -> Vec<GenerationTask> {
  let mut tasks = Vec::with_capacity(groups.len() * environments.len());

  for group in groups {
    let is_fbc = group.is_fbc();
    for &environment in environments {
      tasks.push(GenerationTask {
        group: group.name.clone(),
        is_fbc,
        environment,
        profile: environment.profile(is_fbc),
        sub_components: group.sub_components.clone(),
        ocp_versions: if is_fbc { ocp_versions.to_vec() } else { Vec::new() },
      });
    }
  }

  tasks
}

/// Number of (admission, release plan) documents a matrix produces
pub fn document_counts(tasks: &[GenerationTask]) -> (usize, usize) {
  let admissions = tasks.len();
  let plans = tasks.iter().filter(|t| !t.is_fbc).count();
  (admissions, plans)
}
