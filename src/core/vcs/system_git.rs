//! System git backend
//!
//! Every operation is one `git` subprocess with captured output. Nothing is
//! streamed to the parent's stdout, which the stdio transport owns. Command lines
//! and stderr are passed through URL credential redaction before they reach an
//! error message or a log line.

use crate::core::error::{GitError, ReleaseResult, ResultExt};
use crate::utils::redact_credentials;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Environment variables forwarded to git; everything else is cleared
const FORWARDED_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "XDG_CONFIG_HOME",
  // SSH transport
  "SSH_AUTH_SOCK",
  "GIT_SSH_COMMAND",
  // Corporate proxies and private CAs
  "HTTPS_PROXY",
  "https_proxy",
  "HTTP_PROXY",
  "http_proxy",
  "NO_PROXY",
  "no_proxy",
  "GIT_SSL_CAINFO",
  "GIT_SSL_CAPATH",
  // Commit identity when no git config is present
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
];

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open an existing working tree without spawning git
  pub fn at(path: &Path) -> Self {
    Self {
      work_tree: path.to_path_buf(),
    }
  }

  /// Clone `url` into `dest`, optionally checking out `branch`
  pub fn clone_repo(url: &str, dest: &Path, branch: Option<&str>) -> ReleaseResult<Self> {
    let mut cmd = base_cmd();
    cmd.arg("clone");
    if let Some(branch) = branch {
      cmd.args(["-b", branch]);
    }
    cmd.arg(url).arg(dest);

    let mut display = vec!["clone".to_string()];
    if let Some(branch) = branch {
      display.push("-b".to_string());
      display.push(branch.to_string());
    }
    display.push(url.to_string());
    display.push(dest.display().to_string());

    let output = cmd.output().context("Failed to execute git clone")?;
    check_output(&display, &output)?;

    Ok(Self::at(dest))
  }

  /// Path of the working tree
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Run git with `args` in the working tree, returning trimmed stdout
  pub(crate) fn run(&self, args: &[&str]) -> ReleaseResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().copied().unwrap_or_default()))?;

    let display: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    check_output(&display, &output)?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Runs inside the working tree (`-C`)
  /// - Clears environment variables except the forwarded set
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = base_cmd();
    cmd.arg("-C").arg(&self.work_tree);
    cmd
  }
}

fn base_cmd() -> Command {
  let mut cmd = Command::new("git");

  // Isolated environment (don't trust inherited variables)
  cmd.env_clear();
  forward_env(&mut cmd, |key| std::env::var(key).ok());
  // Never block on a credential prompt
  cmd.env("GIT_TERMINAL_PROMPT", "0");

  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false");

  cmd
}

fn forward_env(cmd: &mut Command, lookup: impl Fn(&str) -> Option<String>) {
  for key in FORWARDED_ENV {
    if let Some(value) = lookup(key) {
      cmd.env(key, value);
    }
  }
}

fn check_output(args: &[String], output: &Output) -> ReleaseResult<()> {
  let command = redact_credentials(&format!("git {}", args.join(" ")));
  if !output.status.success() {
    let stderr = redact_credentials(&String::from_utf8_lossy(&output.stderr));
    return Err(
      GitError::CommandFailed {
        command,
        stderr: stderr.trim_end().to_string(),
      }
      .into(),
    );
  }
  debug!(%command, "git command succeeded");
  Ok(())
}
