//! Check trait abstraction for command preconditions
//!
//! A precondition is a small guard a plugin requires before its handler runs:
//! the build configuration exists, the project is a git repository, the
//! working tree is clean, and so on. Every guard implements [`Check`], so a
//! plugin composes the guards it needs instead of re-implementing them.

use crate::core::error::ProjectorResult;
use crate::core::vcs::{SystemGit, Vcs};
use std::path::Path;

/// Result of running a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
  /// Name of the check that ran
  pub check_name: String,
  pub passed: bool,
  /// Human-readable message
  pub message: String,
  /// Optional suggested fix
  pub suggestion: Option<String>,
}

impl CheckResult {
  /// Create a passing check result
  pub fn pass(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: true,
      message: message.into(),
      suggestion: None,
    }
  }

  /// Create a failing check result
  pub fn fail(check_name: impl Into<String>, message: impl Into<String>, suggestion: Option<impl Into<String>>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: false,
      message: message.into(),
      suggestion: suggestion.map(|s| s.into()),
    }
  }
}

/// Context passed to checks
pub struct CheckContext<'a> {
  /// Project root directory
  pub root: &'a Path,
  vcs: Option<&'a dyn Vcs>,
}

impl<'a> CheckContext<'a> {
  /// Checks that need a repository open it with system git
  pub fn new(root: &'a Path) -> Self {
    Self { root, vcs: None }
  }

  /// Checks that need a repository use `vcs`
  pub fn with_vcs(root: &'a Path, vcs: &'a dyn Vcs) -> Self {
    Self { root, vcs: Some(vcs) }
  }

  /// Run `f` against the project's repository
  pub fn with_repository<T>(&self, f: impl FnOnce(&dyn Vcs) -> ProjectorResult<T>) -> ProjectorResult<T> {
    match self.vcs {
      Some(vcs) => f(vcs),
      None => {
        let git = SystemGit::open(self.root)?;
        f(&git)
      }
    }
  }
}

/// Precondition trait
///
/// # Example
///
/// ```rust,ignore
/// struct ReadmeExists;
///
/// impl Check for ReadmeExists {
///   fn name(&self) -> &str {
///     "readme-exists"
///   }
///
///   fn description(&self) -> &str {
///     "README.md exists"
///   }
///
///   fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
///     if ctx.root.join("README.md").exists() {
///       Ok(CheckResult::pass(self.name(), "found README.md"))
///     } else {
///       Ok(CheckResult::fail(self.name(), "README.md is missing", Some("Write one")))
///     }
///   }
/// }
/// ```
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  /// Run the check and return a result
  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult>;
}
