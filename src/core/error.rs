//! Error types for projector with contextual messages and exit codes
//!
//! Every failure the tool can report is a variant of [`ProjectorError`]. Each
//! category knows its exit code and, where useful, a help line that is printed
//! under the error message.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for projector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Assertion failures, bad arguments, unmet preconditions
  User = 1,
  /// External process, git or I/O failures
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for projector
#[derive(Debug, Error)]
pub enum ProjectorError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Precondition(#[from] PreconditionError),

  #[error(transparent)]
  Version(#[from] VersionError),

  #[error(transparent)]
  Divergence(#[from] DivergenceError),

  #[error(transparent)]
  Dispatch(#[from] DispatchError),

  #[error(transparent)]
  Git(#[from] GitError),

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  /// Generic error with message and optional context
  #[error("{message}{}", render_context(.context))]
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ProjectorError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ProjectorError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ProjectorError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ProjectorError::Message { message, context, help } => ProjectorError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ProjectorError::Io(e) => ProjectorError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ProjectorError::Config(_)
      | ProjectorError::Precondition(_)
      | ProjectorError::Version(_)
      | ProjectorError::Divergence(_)
      | ProjectorError::Dispatch(_)
      | ProjectorError::Message { .. } => ExitCode::User,
      ProjectorError::Git(_) | ProjectorError::Process(_) | ProjectorError::Io(_) => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ProjectorError::Config(e) => e.help_message(),
      ProjectorError::Precondition(e) => e.help.clone(),
      ProjectorError::Version(e) => e.help_message(),
      ProjectorError::Divergence(e) => e.help_message(),
      ProjectorError::Dispatch(e) => e.help_message(),
      ProjectorError::Git(e) => e.help_message(),
      ProjectorError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl From<String> for ProjectorError {
  fn from(msg: String) -> Self {
    ProjectorError::message(msg)
  }
}

impl From<&str> for ProjectorError {
  fn from(msg: &str) -> Self {
    ProjectorError::message(msg)
  }
}

impl From<serde_json::Error> for ProjectorError {
  fn from(err: serde_json::Error) -> Self {
    ProjectorError::message(format!("JSON error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ProjectorError {
  fn from(err: toml_edit::de::Error) -> Self {
    ProjectorError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ProjectorError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ProjectorError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration document errors
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration file not found: {}", .path.display())]
  NotFound { path: PathBuf },

  #[error("Failed to parse {}: {message}", .path.display())]
  Parse { path: PathBuf, message: String },

  #[error("Invalid value for [{section}] {key}: expected {expected}")]
  InvalidValue {
    section: String,
    key: String,
    expected: &'static str,
  },

  #[error("Key '{key}' not found in section [{section}]")]
  MissingKey { section: String, key: String },

  #[error("No section with recipe '{recipe}' found")]
  RecipeNotFound { recipe: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Run `projector repository init` or `projector repository clone` first.".to_string())
      }
      ConfigError::RecipeNotFound { recipe } => Some(format!(
        "Add a section with `recipe = \"{}\"` to the build configuration.",
        recipe
      )),
      _ => None,
    }
  }
}

/// A guard that must hold before a command runs
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PreconditionError {
  pub check: String,
  pub message: String,
  pub help: Option<String>,
}

/// Version tag resolution and existence errors
#[derive(Debug, Error)]
pub enum VersionError {
  #[error("releasing version '{selector}' is disallowed. Did you mean 'version upload'?")]
  UploadOnlySelector { selector: String },

  #[error("version {tag} already released")]
  AlreadyReleased { tag: String },

  #[error("version {tag} was not released yet")]
  NotReleased { tag: String },

  #[error("no release tags found")]
  NoReleases,

  #[error("cannot derive a version from '{description}'")]
  InvalidDescription { description: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::AlreadyReleased { .. } => Some("Use `projector version upload` to publish it again.".to_string()),
      VersionError::NotReleased { .. } => Some("Release it first with `projector version release`.".to_string()),
      _ => None,
    }
  }
}

/// Branch relationship assertions made before a release
#[derive(Debug, Error)]
pub enum DivergenceError {
  #[error("{stable} branch is not merged into {integration}")]
  StableNotMerged { stable: String, integration: String },

  #[error("local branch {branch} is behind {upstream}")]
  BehindRemote { branch: String, upstream: String },

  #[error("fetch from {remote} failed: {reason}")]
  FetchFailed { remote: String, reason: String },
}

impl DivergenceError {
  fn help_message(&self) -> Option<String> {
    match self {
      DivergenceError::StableNotMerged { stable, integration } => Some(format!(
        "Merge {} into {} before releasing.",
        stable, integration
      )),
      DivergenceError::BehindRemote { .. } => Some("Pull the remote changes before releasing.".to_string()),
      DivergenceError::FetchFailed { .. } => Some("Either fix this or run with --no-fetch".to_string()),
    }
  }
}

/// Dispatcher failures
#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("No matching plugin found")]
  NoMatchingPlugin,

  #[error("No matching method found for '{plugin}'")]
  NoMatchingHandler { plugin: String },

  #[error("{0}")]
  Usage(String),
}

impl DispatchError {
  fn help_message(&self) -> Option<String> {
    match self {
      DispatchError::NoMatchingPlugin | DispatchError::NoMatchingHandler { .. } => {
        Some("Run `projector --help` for the list of commands.".to_string())
      }
      DispatchError::Usage(_) => None,
    }
  }
}

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
  #[error("Git command failed: {command}\n{stderr}")]
  CommandFailed { command: String, stderr: String },

  #[error("Git repository not found at: {}", .path.display())]
  RepoNotFound { path: PathBuf },

  #[error("Reference not found: {name}")]
  RefNotFound { name: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

/// External process failure, carrying everything the process reported
#[derive(Debug, Error)]
#[error("Command failed ({}): {command}{}", render_code(.code), render_streams(.stdout, .stderr))]
pub struct ProcessError {
  pub command: String,
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

fn render_context(context: &Option<String>) -> String {
  context.as_ref().map(|c| format!("\n{}", c)).unwrap_or_default()
}

fn render_code(code: &Option<i32>) -> String {
  code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string())
}

fn render_streams(stdout: &str, stderr: &str) -> String {
  let mut out = String::new();
  if !stdout.trim().is_empty() {
    out.push_str(&format!("\nstdout:\n{}", stdout.trim_end()));
  }
  if !stderr.trim().is_empty() {
    out.push_str(&format!("\nstderr:\n{}", stderr.trim_end()));
  }
  out
}

/// Result type alias for projector
pub type ProjectorResult<T> = Result<T, ProjectorError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ProjectorResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ProjectorResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ProjectorError>,
{
  fn context(self, ctx: impl Into<String>) -> ProjectorResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ProjectorResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with its help text
pub fn print_error(error: &ProjectorError) {
  eprintln!("\nerror: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("Help: {}\n", help);
  }
}
