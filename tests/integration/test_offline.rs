//! Tests for the offline `render` and `update-branches` commands

use crate::helpers::*;
use anyhow::Result;

const ADMISSION_DIR: &str = "config/kflux-prd-rh02.0fk9.p1/product/ReleasePlanAdmission/tekton-ecosystem";
const RELEASE_PLAN_DIR: &str = "tenants-config/cluster/kflux-prd-rh02/tenants/tekton-ecosystem-tenant";

fn yaml_files(workspace: &TestWorkspace, dir: &str) -> Result<Vec<String>> {
  let mut names: Vec<String> = std::fs::read_dir(workspace.path.join(dir))?
    .filter_map(Result::ok)
    .map(|e| e.file_name().to_string_lossy().into_owned())
    .filter(|n| n.ends_with(".yaml") && n != "kustomization.yaml")
    .collect();
  names.sort();
  Ok(names)
}

#[test]
fn test_render_default_matrix() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  run_release_mcp(
    &workspace.path,
    &["render", "--minor-version", "1.21", "--patch-version", "1", "--output", "out"],
  )?;

  let admissions = yaml_files(&workspace, &format!("out/{}", ADMISSION_DIR))?;
  let plans = yaml_files(&workspace, &format!("out/{}", RELEASE_PLAN_DIR))?;
  assert_eq!(admissions.len(), 8);
  assert_eq!(plans.len(), 6);
  assert!(admissions.contains(&"openshift-pipelines-1.21-fbc-prod.yaml".to_string()));
  assert!(!plans.iter().any(|p| p.contains("fbc")));

  let fbc = workspace.read_file(&format!("out/{}/openshift-pipelines-1.21-fbc-prod.yaml", ADMISSION_DIR))?;
  for ocp in ["4-15", "4-16", "4-17", "4-18", "4-19"] {
    assert!(fbc.contains(ocp), "fbc admission is missing {}", ocp);
  }

  let core_plan = workspace.read_file(&format!(
    "out/{}/openshift-pipelines-core-1.21-prod-release-as-op.yaml",
    RELEASE_PLAN_DIR
  ))?;
  assert!(core_plan.contains("1.21.1"));
  assert!(core_plan.contains("RHBA"));
  Ok(())
}

#[test]
fn test_render_twice_keeps_kustomization_stable() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    &format!("out/{}/kustomization.yaml", RELEASE_PLAN_DIR),
    "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - existing.yaml\n",
  )?;

  let args = ["render", "--minor-version", "1.22", "--ocp-version", "4-19", "--output", "out"];
  run_release_mcp(&workspace.path, &args)?;
  let first = workspace.read_file(&format!("out/{}/kustomization.yaml", RELEASE_PLAN_DIR))?;
  run_release_mcp(&workspace.path, &args)?;
  let second = workspace.read_file(&format!("out/{}/kustomization.yaml", RELEASE_PLAN_DIR))?;

  assert_eq!(first, second);
  assert_eq!(first.matches("  - ").count(), 7);
  assert!(first.ends_with("  - existing.yaml\n"));
  Ok(())
}

#[test]
fn test_update_branches_in_local_tree() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    "repos/pipeline.yaml",
    "# pipeline\nname: tektoncd-pipeline\nupstream: tektoncd/pipeline\npatches: &patches\n  - name: fix\n    script: x\nbranches:\n  - name: release-v1.20.x\n    upstream: release-v0.65.x\n    patches: *patches\n    versions:\n      - \"1.20\"\n\ncomponents:\n  - controller\n",
  )?;
  workspace.write_file("repos/cache.yaml", "name: tekton-caches\nupstream: openshift-pipelines/tekton-caches\n")?;
  workspace.write_file("repos/broken.yaml", "name: [unterminated\n")?;
  workspace.write_file("repos/notes.txt", "name: ignored\n")?;

  let output = run_release_mcp(
    &workspace.path,
    &[
      "update-branches",
      "--minor-version",
      "1.21",
      "--upstream",
      "pipeline=release-v0.68.x",
      "--upstream",
      "cache=release-v0.1.x",
      "--repos-dir",
      "repos",
    ],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Skipped broken.yaml"), "{}", stdout);
  assert!(stdout.contains("Updated cache.yaml (tekton-caches)"));
  assert!(stdout.contains("Updated pipeline.yaml (tektoncd-pipeline)"));

  assert_eq!(
    workspace.read_file("repos/pipeline.yaml")?,
    "# pipeline\nname: tektoncd-pipeline\nupstream: tektoncd/pipeline\npatches: &patches\n  - name: fix\n    script: x\nbranches:\n  - name: release-v1.21.x\n    upstream: release-v0.68.x\n    patches: *patches\n    versions:\n      - \"1.21\"\n\ncomponents:\n  - controller\n"
  );
  assert_eq!(
    workspace.read_file("repos/cache.yaml")?,
    "name: tekton-caches\nupstream: openshift-pipelines/tekton-caches\nbranches:\n  - name: release-v0.1.x\n    versions:\n      - \"1.21\"\n"
  );
  assert_eq!(workspace.read_file("repos/broken.yaml")?, "name: [unterminated\n");
  assert!(workspace.file_exists("repos/notes.txt"));
  Ok(())
}
