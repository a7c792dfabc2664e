//! Tests for release branch creation against local bare repositories

use crate::helpers::*;
use anyhow::Result;

fn branch_config(workspace: &TestWorkspace, repos: &[&str]) -> Result<()> {
  let mut config = String::new();
  for name in repos {
    let bare = workspace.bare_repo(name, "next")?;
    config.push_str(&format!(
      "[[repositories]]\nname = \"{}\"\nurl = '{}'\n\n",
      name,
      bare.display()
    ));
  }
  config.push_str("[[repositories]]\nname = \"manual-approval-gate\"\nskip = true\n");
  workspace.write_config(&config)?;
  Ok(())
}

#[test]
fn test_branches_created_in_every_repository() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  branch_config(&workspace, &["pipeline", "triggers"])?;

  let output = run_release_mcp(&workspace.path, &["branches", "--minor-version", "1.21"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Successfully created release branches for version 1.21"));

  for name in ["pipeline", "triggers"] {
    let bare = workspace.path.join("remotes").join(format!("{}.git", name));
    assert!(has_branch(&bare, "release-v1.21.x"), "{} has no release branch", name);
    assert!(has_branch(&bare, "next"));
  }
  Ok(())
}

#[test]
fn test_branches_through_mcp_tool_call() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  branch_config(&workspace, &["chains"])?;

  let responses = mcp_session(
    &workspace.path,
    &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create-release-branches","arguments":{"minor_version":"1.22"}}}"#],
  )?;

  let result = &responses[0]["result"];
  assert!(result.get("isError").is_none(), "{}", result);
  assert_eq!(result["content"][0]["text"], "Successfully created release branches for version 1.22");
  assert!(has_branch(&workspace.path.join("remotes").join("chains.git"), "release-v1.22.x"));
  Ok(())
}

#[test]
fn test_missing_source_branch_stops_the_run() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let first = workspace.bare_repo("operator", "main")?;
  let second = workspace.bare_repo("results", "next")?;
  workspace.write_config(&format!(
    "[[repositories]]\nname = \"operator\"\nurl = '{}'\n\n[[repositories]]\nname = \"results\"\nurl = '{}'\n",
    first.display(),
    second.display()
  ))?;

  let output = run_release_mcp_unchecked(&workspace.path, &["branches", "--minor-version", "1.21"])?;
  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("failed to create branch for operator"), "{}", stderr);

  // Processing stops at the first failure
  assert!(!has_branch(&second, "release-v1.21.x"));
  Ok(())
}
