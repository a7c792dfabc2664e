//! Error types for release-mcp with contextual messages and exit codes
//!
//! Every failure is categorized so the tool layer can decide how to surface it:
//! validation errors become protocol-level errors, everything else becomes the
//! failure text of a tool result. Errors carry an optional help message that the
//! CLI prints below the error.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, malformed documents)
  User = 1,
  /// System error (git, gh, network, I/O)
  System = 2,
  /// Validation failure (missing parameters or credentials)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for release-mcp
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Git and pull-request CLI errors
  Git(GitError),

  /// Parameter and credential validation errors
  Validation(ValidationError),

  /// Malformed input documents (hack repository YAML)
  Document(DocumentError),

  /// Manifest template errors
  Template { template: String, reason: String },

  /// I/O errors
  Io(io::Error),

  /// An error wrapped with the step that produced it
  Context { context: String, source: Box<ReleaseError> },

  /// Free-form error message
  Message { message: String },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message { message: msg.into() }
  }

  /// Wrap this error with the step that failed
  pub fn context(self, ctx: impl Into<String>) -> Self {
    ReleaseError::Context {
      context: ctx.into(),
      source: Box::new(self),
    }
  }

  /// Innermost error, skipping context wrappers
  pub fn root(&self) -> &ReleaseError {
    match self {
      ReleaseError::Context { source, .. } => source.root(),
      other => other,
    }
  }

  /// True for missing or invalid tool parameters
  pub fn is_validation(&self) -> bool {
    matches!(self.root(), ReleaseError::Validation(_))
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Validation(_) => ExitCode::Validation,
      ReleaseError::Document(_) => ExitCode::User,
      ReleaseError::Template { .. } => ExitCode::User,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Context { source, .. } => source.exit_code(),
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Validation(e) => e.help_message(),
      ReleaseError::Context { source, .. } => source.help_message(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Validation(e) => write!(f, "{}", e),
      ReleaseError::Document(e) => write!(f, "{}", e),
      ReleaseError::Template { template, reason } => write!(f, "template '{}' failed: {}", template, reason),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Context { context, source } => write!(f, "{}: {}", context, source),
      ReleaseError::Message { message } => write!(f, "{}", message),
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<ValidationError> for ReleaseError {
  fn from(err: ValidationError) -> Self {
    ReleaseError::Validation(err)
  }
}

impl From<DocumentError> for ReleaseError {
  fn from(err: DocumentError) -> Self {
    ReleaseError::Document(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::Config(ConfigError::Parse {
      reason: err.to_string(),
    })
  }
}

impl From<serde_yaml::Error> for ReleaseError {
  fn from(err: serde_yaml::Error) -> Self {
    ReleaseError::Document(DocumentError::Parse {
      reason: err.to_string(),
    })
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<tera::Error> for ReleaseError {
  fn from(err: tera::Error) -> Self {
    // Tera nests the useful detail in the source chain
    let mut reason = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
      reason.push_str(": ");
      reason.push_str(&inner.to_string());
      source = inner.source();
    }
    let template = match &err.kind {
      tera::ErrorKind::TemplateNotFound(name) => name.clone(),
      _ => "unknown".to_string(),
    };
    ReleaseError::Template { template, reason }
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<tokio::task::JoinError> for ReleaseError {
  fn from(err: tokio::task::JoinError) -> Self {
    ReleaseError::message(format!("Tool task failed: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Config file could not be parsed
  Parse { reason: String },

  /// Missing required field
  MissingField { field: String },

  /// Two entries share a name that must be unique
  Duplicate { kind: String, name: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Pass --config with an existing file or unset RELEASE_MCP_CONFIG to use built-in defaults.".to_string())
      }
      ConfigError::Duplicate { kind, .. } => Some(format!("Each {} must appear once in release-mcp.toml.", kind)),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::Parse { reason } => write!(f, "Invalid config: {}", reason),
      ConfigError::MissingField { field } => write!(f, "Missing required field in config: {}", field),
      ConfigError::Duplicate { kind, name } => write!(f, "Duplicate {} '{}' in config", kind, name),
    }
  }
}

/// Git and gh command errors
#[derive(Debug)]
pub enum GitError {
  /// Command exited unsuccessfully or could not be spawned
  CommandFailed { command: String, stderr: String },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },

  /// `gh pr create` failed
  PullRequestFailed { repo: String, reason: String },

  /// Fork owner could not be derived from the origin URL
  UnknownOwner { remote_url: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The release branch already exists on the remote with different history.".to_string())
        } else if reason.contains("Permission denied") || reason.contains("403") {
          Some("Check SSH keys or GITLAB_TOKEN permissions for the target repository.".to_string())
        } else {
          None
        }
      }
      GitError::PullRequestFailed { .. } => Some("Run `gh auth status` to verify the GitHub CLI is logged in.".to_string()),
      GitError::UnknownOwner { .. } => {
        Some("origin must be a GitHub fork URL (git@github.com:owner/repo.git or https://github.com/owner/repo).".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Command failed: {}", command)?;
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push of {} to {} failed: {}", branch, remote, reason.trim_end())
      }
      GitError::PullRequestFailed { repo, reason } => {
        write!(f, "Failed to create pull request in {}: {}", repo, reason.trim_end())
      }
      GitError::UnknownOwner { remote_url } => {
        write!(f, "Could not determine fork owner from URL: {}", remote_url)
      }
    }
  }
}

/// Tool parameter and credential errors
#[derive(Debug)]
pub enum ValidationError {
  /// Required tool parameter missing or empty
  MissingParameter { name: String },

  /// Required environment variables unset
  MissingCredentials { variables: Vec<String> },

  /// Value present but unusable
  InvalidValue { field: String, reason: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::MissingCredentials { variables } => {
        Some(format!("Export {} before starting the server.", variables.join(" and ")))
      }
      _ => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::MissingParameter { name } => write!(f, "{} parameter is required", name),
      ValidationError::MissingCredentials { variables } => {
        write!(f, "{} environment variables must be set", variables.join(" and "))
      }
      ValidationError::InvalidValue { field, reason } => write!(f, "invalid {}: {}", field, reason),
    }
  }
}

/// Malformed hack repository documents
#[derive(Debug)]
pub enum DocumentError {
  /// YAML could not be parsed
  Parse { reason: String },

  /// Top-level `name` missing or not a string
  MissingName,
}

impl fmt::Display for DocumentError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DocumentError::Parse { reason } => write!(f, "failed to parse YAML: {}", reason),
      DocumentError::MissingName => write!(f, "top-level 'name' is missing or not a string"),
    }
  }
}

/// Result type alias for release-mcp
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
