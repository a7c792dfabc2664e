//! Tests for the remote `plans` and `hack` commands that fail before any push

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_plans_require_gitlab_credentials() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release_mcp_unchecked(&workspace.path, &["plans", "--minor-version", "1.21"])?;
  assert_eq!(output.status.code(), Some(3));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("GITLAB_USERNAME and GITLAB_TOKEN environment variables must be set"), "{}", stderr);
  assert!(output.stdout.is_empty());
  Ok(())
}

#[test]
fn test_hack_fails_without_release_branch() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let hack = workspace.bare_repo("hack", "main")?;
  workspace.write_config(&format!(
    "[hack]\nurl = '{}'\nupstream_repo = \"example/hack\"\n",
    hack.display()
  ))?;

  let output = run_release_mcp_unchecked(
    &workspace.path,
    &["hack", "--minor-version", "1.21", "--upstream", "pipeline=release-v0.68.x"],
  )?;
  assert_eq!(output.status.code(), Some(2));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("release-v1.21.x"), "{}", stderr);
  Ok(())
}

#[test]
fn test_empty_minor_version_is_rejected_before_git() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let bare = workspace.bare_repo("pipeline", "next")?;
  workspace.write_config(&format!("[[repositories]]\nname = \"pipeline\"\nurl = '{}'\n", bare.display()))?;

  let output = run_release_mcp_unchecked(&workspace.path, &["branches", "--minor-version", ""])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("minor_version parameter is required"));
  assert!(output.stdout.is_empty());
  assert!(!has_branch(&bare, "release-v.x"));

  for args in [
    vec!["plans", "--minor-version", ""],
    vec!["hack", "--minor-version", ""],
    vec!["render", "--minor-version", "", "--output", "out"],
    vec!["update-branches", "--minor-version", "", "--repos-dir", "."],
  ] {
    let output = run_release_mcp_unchecked(&workspace.path, &args)?;
    assert_eq!(output.status.code(), Some(3), "{:?}", args);
  }
  assert!(!workspace.file_exists("out"));
  Ok(())
}

#[test]
fn test_invalid_upstream_argument() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release_mcp_unchecked(
    &workspace.path,
    &["update-branches", "--minor-version", "1.21", "--upstream", "pipeline", "--repos-dir", "."],
  )?;
  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("expected component=version"));
  Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release_mcp_unchecked(
    &workspace.path,
    &["--config", "missing.toml", "render", "--minor-version", "1.21", "--output", "out"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!workspace.file_exists("out"));
  Ok(())
}
