//! ReleasePlanAdmission and ReleasePlan rendering
//!
//! Both documents are Tera templates registered at construction. Placeholders
//! the release pipeline resolves later (`{{ git_sha }}`, `{{ OCP_VERSION }}`)
//! are emitted literally, either through `raw` blocks or through context values.

use super::matrix::{EnvironmentProfile, FbcSetting, GenerationTask, SubComponent};
use super::version::ResolvedRelease;
use crate::core::error::ReleaseResult;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Tera, Value};

const ADMISSION_TEMPLATE_NAME: &str = "release-plan-admission.yaml.tera";
const RELEASE_PLAN_TEMPLATE_NAME: &str = "release-plan.yaml.tera";

const ADMISSION_TEMPLATE: &str = r#"apiVersion: appstudio.redhat.com/v1alpha1
kind: ReleasePlanAdmission
metadata:
  labels:
    release.appstudio.openshift.io/block-releases: "false"
    pp.engineering.redhat.com/business-unit: {{ profile.business_unit }}
  name: {{ name }}
  namespace: rhtap-releng-tenant
  annotations:
    rhel_target: el9
spec:
{%- if is_fbc %}
  applications:
{%- for ocp in ocp_versions %}
    - openshift-pipelines-index-{{ ocp }}-{{ minor }}
{%- endfor %}
{%- else %}
  applications: [ openshift-pipelines-{{ group }}-{{ minor }} ]
{%- endif %}
  origin: tekton-ecosystem-tenant
  policy: {{ profile.policy_name }}
  data:
    releaseNotes:
      product_id: [ 604 ]
      product_name: "Red Hat OpenShift Pipelines"
      product_version: {% if is_fbc %}fbc{% else %}{{ full_version }}{% endif %}
{%- if is_fbc %}
      references:
        - "https://docs.redhat.com/en/documentation/red_hat_openshift_pipelines/"
{%- endif %}
      type: "{{ release_type }}"
{%- if is_fbc %}
    fbc:
      allowedPackages:
{%- for package in allowed_packages %}
        - {{ package }}
{%- endfor %}
{%- for setting in fbc_settings %}
      {{ setting.key }}: {{ setting.value }}
{%- endfor %}
{%- else %}
    mapping:
      components:
{%- for sub in sub_components %}
        - name: tektoncd-{{ group }}-{{ minor }}-{{ sub.name }}
          repository: "{{ profile.registry_host }}/openshift-pipelines/{{ sub.repository }}"
          pushSourceContainer: true
{%- endfor %}
      defaults:
        tags:
          - "{% raw %}{{ git_sha }}{% endraw %}"
          - "{% raw %}{{ git_short_sha }}{% endraw %}"
          - "v{{ full_version }}"
          - "v{{ full_version }}-{% raw %}{{ timestamp }}{% endraw %}"
{%- endif %}
    intention: {{ profile.intention_label }}
  pipeline:
    serviceAccountName: {{ profile.service_account }}
    timeouts:
      pipeline: "10h0m0s"
      tasks: 10h0m0s
    pipelineRef:
      resolver: git
      params:
        - name: url
          value: "https://github.com/konflux-ci/release-service-catalog.git"
        - name: revision
          value: production
        - name: pathInRepo
{%- if is_fbc %}
          value: "pipelines/managed/fbc-release/fbc-release.yaml"
{%- else %}
          value: "pipelines/managed/rh-advisories/rh-advisories.yaml"
{%- endif %}
"#;

const RELEASE_PLAN_TEMPLATE: &str = r#"apiVersion: appstudio.redhat.com/v1alpha1
kind: ReleasePlan
metadata:
  labels:
    release.appstudio.openshift.io/auto-release: "false"
    release.appstudio.openshift.io/standing-attribution: "true"
    release.appstudio.openshift.io/releasePlanAdmission: openshift-pipelines-{{ group }}-{{ minor }}-{{ env }}
  name: openshift-pipelines-{{ group }}-{{ minor }}-{{ env }}-release-as-op
spec:
  application: openshift-pipelines-{{ group }}-{{ minor }}
  target: rhtap-releng-tenant
  data:
    releaseNotes:
      references:
        - "https://docs.redhat.com/en/documentation/red_hat_openshift_pipelines"
      type: "{{ release_type }}"
      solution: |
        Red Hat OpenShift Pipelines is a cloud-native, continuous integration and
        continuous delivery (CI/CD) solution based on Kubernetes resources.
        It uses Tekton building blocks to automate deployments across multiple
        platforms by abstracting away the underlying implementation details.
        Tekton introduces a number of standard custom resource definitions (CRDs)
        for defining CI/CD pipelines that are portable across Kubernetes distributions.
      description: "The {{ full_version }} release of Red Hat OpenShift Pipelines {{ group | product_title }}."
      topic: |
        The {{ full_version }} GA release of Red Hat OpenShift Pipelines {{ group | product_title }}.
        For more details see [product documentation](https://docs.redhat.com/en/documentation/red_hat_openshift_pipelines).
      synopsis: "Red Hat OpenShift Pipelines Release {{ full_version }}"
"#;

/// A rendered file, named relative to its target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
  pub file_name: String,
  pub content: String,
}

/// Output of rendering one [`GenerationTask`]
#[derive(Debug, Clone)]
pub struct RenderedDocuments {
  pub admission: Document,
  /// `None` for the FBC group
  pub release_plan: Option<Document>,
}

/// Values shared by both templates
#[derive(Serialize)]
struct TemplateValues<'a> {
  name: String,
  group: &'a str,
  minor: &'a str,
  full_version: &'a str,
  release_type: &'static str,
  env: &'static str,
  is_fbc: bool,
  profile: &'a EnvironmentProfile,
  sub_components: &'a [SubComponent],
  ocp_versions: &'a [String],
  allowed_packages: Vec<&'static str>,
  fbc_settings: Vec<FbcSetting>,
}

/// Title-case a component group for release notes
///
/// `cli` and `fbc` are acronyms; anything else gets each word capitalized.
pub fn product_title(name: &str) -> String {
  match name {
    "cli" => "CLI".to_string(),
    "fbc" => "FBC".to_string(),
    _ => {
      let mut out = String::with_capacity(name.len());
      let mut at_word_start = true;
      for c in name.chars() {
        if at_word_start {
          out.extend(c.to_uppercase());
        } else {
          out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
      }
      out
    }
  }
}

fn product_title_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
  let name = tera::try_get_value!("product_title", "value", String, value);
  Ok(Value::String(product_title(&name)))
}

/// Tera environment holding the admission and release plan templates
pub struct Renderer {
  tera: Tera,
}

impl Renderer {
  /// Parse both templates and register the `product_title` filter
  pub fn new() -> ReleaseResult<Self> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("product_title", product_title_filter);
    tera.add_raw_template(ADMISSION_TEMPLATE_NAME, ADMISSION_TEMPLATE)?;
    tera.add_raw_template(RELEASE_PLAN_TEMPLATE_NAME, RELEASE_PLAN_TEMPLATE)?;
    Ok(Self { tera })
  }

  /// Render the documents for one task
  pub fn render(&self, task: &GenerationTask, release: &ResolvedRelease) -> ReleaseResult<RenderedDocuments> {
    let minor = release.minor.as_str();
    let fbc = task.environment.fbc_profile();
    let values = TemplateValues {
      name: task.admission_file_name(minor).trim_end_matches(".yaml").to_string(),
      group: &task.group,
      minor,
      full_version: &release.full_version,
      release_type: release.release_type.as_str(),
      env: task.environment.as_str(),
      is_fbc: task.is_fbc,
      profile: &task.profile,
      sub_components: &task.sub_components,
      ocp_versions: &task.ocp_versions,
      allowed_packages: fbc.allowed_packages.clone(),
      fbc_settings: fbc.settings(),
    };
    let context = tera::Context::from_serialize(&values)?;

    let admission = Document {
      file_name: task.admission_file_name(minor),
      content: self.tera.render(ADMISSION_TEMPLATE_NAME, &context)?,
    };

    let release_plan = match task.release_plan_file_name(minor) {
      Some(file_name) => Some(Document {
        file_name,
        content: self.tera.render(RELEASE_PLAN_TEMPLATE_NAME, &context)?,
      }),
      None => None,
    };

    Ok(RenderedDocuments {
      admission,
      release_plan,
    })
  }

  /// Render every task; the first failure aborts
  pub fn render_all(&self, tasks: &[GenerationTask], release: &ResolvedRelease) -> ReleaseResult<Vec<RenderedDocuments>> {
    tasks.iter().map(|task| self.render(task, release)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::release::matrix::{ComponentGroup, Environment, FBC_GROUP, expand};
  use crate::release::version::ReleaseVersion;

  fn core_group() -> ComponentGroup {
    ComponentGroup::new(
      "core",
      vec![
        SubComponent {
          name: "controller".to_string(),
          repository: "pipelines-core-controller-rhel9".to_string(),
        },
        SubComponent {
          name: "webhook".to_string(),
          repository: "pipelines-core-webhook-rhel9".to_string(),
        },
      ],
    )
  }

  fn render_one(group: ComponentGroup, env: Environment, patch: Option<&str>) -> RenderedDocuments {
    let ocp = vec!["4-15".to_string(), "4-16".to_string(), "4-17".to_string()];
    let tasks = expand(&[group], &[env], &ocp);
    let release = ReleaseVersion::new("1.21", patch.map(str::to_string)).resolve();
    Renderer::new().unwrap().render(&tasks[0], &release).unwrap()
  }

  #[test]
  fn test_product_title() {
    assert_eq!(product_title("cli"), "CLI");
    assert_eq!(product_title("fbc"), "FBC");
    assert_eq!(product_title("core"), "Core");
    assert_eq!(product_title("operator"), "Operator");
    assert_eq!(product_title("git-init"), "Git-Init");
  }

  #[test]
  fn test_admission_for_component_group() {
    let docs = render_one(core_group(), Environment::Stage, None);
    let content = &docs.admission.content;

    assert_eq!(docs.admission.file_name, "openshift-pipelines-core-1.21-stage.yaml");
    assert!(content.contains("  name: openshift-pipelines-core-1.21-stage\n"));
    assert!(content.contains("  applications: [ openshift-pipelines-core-1.21 ]\n"));
    assert!(content.contains("  policy: registry-standard-stage\n"));
    assert!(content.contains("      product_version: 1.21.0\n"));
    assert!(content.contains("      type: \"RHEA\"\n"));
    assert!(content.contains("        - name: tektoncd-core-1.21-controller\n"));
    assert!(content.contains("          repository: \"registry.stage.redhat.io/openshift-pipelines/pipelines-core-webhook-rhel9\"\n"));
    assert!(content.contains("    serviceAccountName: release-registry-staging\n"));
    assert!(content.contains("pipelines/managed/rh-advisories/rh-advisories.yaml"));
    assert!(!content.contains("fbc:"));
  }

  #[test]
  fn test_admission_tags_keep_pipeline_placeholders() {
    let docs = render_one(core_group(), Environment::Prod, Some("2"));
    let content = &docs.admission.content;

    assert!(content.contains("          - \"{{ git_sha }}\"\n"));
    assert!(content.contains("          - \"{{ git_short_sha }}\"\n"));
    assert!(content.contains("          - \"v1.21.2\"\n"));
    assert!(content.contains("          - \"v1.21.2-{{ timestamp }}\"\n"));
    assert!(content.contains("      type: \"RHBA\"\n"));
  }

  #[test]
  fn test_admission_is_valid_yaml() {
    let docs = render_one(core_group(), Environment::Prod, None);
    let value: serde_yaml::Value = serde_yaml::from_str(&docs.admission.content).unwrap();

    assert_eq!(value["kind"].as_str(), Some("ReleasePlanAdmission"));
    let components = value["spec"]["data"]["mapping"]["components"].as_sequence().unwrap();
    assert_eq!(components.len(), 2);
    assert_eq!(value["spec"]["data"]["intention"].as_str(), Some("production"));
    assert_eq!(value["spec"]["pipeline"]["timeouts"]["pipeline"].as_str(), Some("10h0m0s"));
  }

  #[test]
  fn test_fbc_admission_lists_every_ocp_version() {
    let docs = render_one(ComponentGroup::new(FBC_GROUP, vec![]), Environment::Stage, None);
    let content = &docs.admission.content;

    assert_eq!(docs.admission.file_name, "openshift-pipelines-1.21-fbc-stage.yaml");
    assert!(docs.release_plan.is_none());
    assert!(content.contains("  name: openshift-pipelines-1.21-fbc-stage\n"));
    for ocp in ["4-15", "4-16", "4-17"] {
      assert!(content.contains(&format!("    - openshift-pipelines-index-{}-1.21\n", ocp)));
    }
    assert!(content.contains("      product_version: fbc\n"));
    assert!(content.contains("    pp.engineering.redhat.com/business-unit: hybrid-platforms\n"));
    assert!(content.contains("pipelines/managed/fbc-release/fbc-release.yaml"));
    assert!(!content.contains("mapping:"));
  }

  #[test]
  fn test_fbc_block_order_and_values() {
    let stage = render_one(ComponentGroup::new(FBC_GROUP, vec![]), Environment::Stage, None);
    let expected = "    fbc:\n      allowedPackages:\n        - openshift-pipelines-operator-rh\n      buildTimeoutSeconds: 1500\n      fromIndex: registry-proxy.engineering.redhat.com/rh-osbs/iib-pub-pending:{{ OCP_VERSION }}\n      publishingCredentials: staged-index-fbc-publishing-credentials\n      requestTimeoutSeconds: 1500\n      stagedIndex: true\n      targetIndex: \n";
    assert!(stage.admission.content.contains(expected), "{}", stage.admission.content);

    let prod = render_one(ComponentGroup::new(FBC_GROUP, vec![]), Environment::Prod, None);
    assert!(!prod.admission.content.contains("stagedIndex"));
    assert!(
      prod
        .admission
        .content
        .contains("      targetIndex: quay.io/redhat-prod/redhat----redhat-operator-index:{{ OCP_VERSION }}\n")
    );
  }

  #[test]
  fn test_release_plan() {
    let cli = ComponentGroup::new("cli", vec![]);
    let docs = render_one(cli, Environment::Prod, Some("1"));
    let plan = docs.release_plan.unwrap();

    assert_eq!(plan.file_name, "openshift-pipelines-cli-1.21-prod-release-as-op.yaml");
    assert!(plan.content.contains("    release.appstudio.openshift.io/releasePlanAdmission: openshift-pipelines-cli-1.21-prod\n"));
    assert!(plan.content.contains("  name: openshift-pipelines-cli-1.21-prod-release-as-op\n"));
    assert!(plan.content.contains("\"The 1.21.1 release of Red Hat OpenShift Pipelines CLI.\""));
    assert!(plan.content.contains("\"Red Hat OpenShift Pipelines Release 1.21.1\""));

    let value: serde_yaml::Value = serde_yaml::from_str(&plan.content).unwrap();
    assert_eq!(value["kind"].as_str(), Some("ReleasePlan"));
    assert_eq!(value["spec"]["target"].as_str(), Some("rhtap-releng-tenant"));
    assert!(value["spec"]["data"]["releaseNotes"]["solution"].as_str().unwrap().starts_with("Red Hat OpenShift Pipelines is"));
  }

  #[test]
  fn test_render_all_default_table() {
    let config = crate::core::config::ReleaseConfig::default();
    let tasks = expand(&config.component_groups, &Environment::ALL, &config.default_ocp_versions);
    let release = ReleaseVersion::new("1.21", None).resolve();
    let docs = Renderer::new().unwrap().render_all(&tasks, &release).unwrap();

    assert_eq!(docs.len(), 8);
    assert_eq!(docs.iter().filter(|d| d.release_plan.is_some()).count(), 6);
  }
}
