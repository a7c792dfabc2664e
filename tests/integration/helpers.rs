//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Scratch directory holding fixture repositories and a config file
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Create a bare repository whose only branch is `branch`, with one commit
  pub fn bare_repo(&self, name: &str, branch: &str) -> Result<PathBuf> {
    let seed = self.path.join("seed").join(name);
    std::fs::create_dir_all(&seed)?;
    git(&seed, &["init", &format!("--initial-branch={}", branch)])?;
    git(&seed, &["config", "user.name", "Test User"])?;
    git(&seed, &["config", "user.email", "test@example.com"])?;
    std::fs::write(seed.join("README.md"), format!("# {}\n", name))?;
    git(&seed, &["add", "."])?;
    git(&seed, &["commit", "-m", "Initial commit"])?;

    let bare = self.path.join("remotes").join(format!("{}.git", name));
    std::fs::create_dir_all(bare.parent().context("bare repo has no parent")?)?;
    git(
      &self.path,
      &["clone", "--bare", &seed.display().to_string(), &bare.display().to_string()],
    )?;
    Ok(bare)
  }

  /// Write `release-mcp.toml` at the workspace root
  pub fn write_config(&self, content: &str) -> Result<PathBuf> {
    let path = self.path.join("release-mcp.toml");
    std::fs::write(&path, content)?;
    Ok(path)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Does `branch` exist in the bare repository at `repo`
pub fn has_branch(repo: &Path, branch: &str) -> bool {
  Command::new("git")
    .arg("--git-dir")
    .arg(repo)
    .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
    .output()
    .map(|o| o.status.success())
    .unwrap_or(false)
}

fn command(cwd: &Path, args: &[&str]) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_release-mcp"));
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("RELEASE_MCP_CONFIG")
    .env_remove("GITLAB_USERNAME")
    .env_remove("GITLAB_TOKEN")
    .env("RUST_LOG", "warn");
  cmd
}

/// Run release-mcp and require success
pub fn run_release_mcp(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_release_mcp_unchecked(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "release-mcp command failed: release-mcp {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run release-mcp and return the output whatever the exit status
pub fn run_release_mcp_unchecked(cwd: &Path, args: &[&str]) -> Result<Output> {
  command(cwd, args).output().context("Failed to run release-mcp")
}

/// Feed `messages` to `release-mcp serve --transport stdio` and collect one
/// parsed JSON value per response line
pub fn mcp_session(cwd: &Path, messages: &[&str]) -> Result<Vec<serde_json::Value>> {
  let mut child = command(cwd, &["serve", "--transport", "stdio"])
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to start release-mcp serve")?;

  {
    let mut stdin = child.stdin.take().context("stdin not captured")?;
    for message in messages {
      writeln!(stdin, "{}", message)?;
    }
  }

  let output = child.wait_with_output()?;
  anyhow::ensure!(
    output.status.success(),
    "release-mcp serve failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );

  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(|line| serde_json::from_str(line).with_context(|| format!("invalid response line: {}", line)))
    .collect()
}
