//! Checks on files the project must contain

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::build;
use crate::core::config::CONFIG_FILE;
use crate::core::error::ProjectorResult;
use crate::core::vcs::SystemGit;

/// The build configuration exists at the project root
pub struct ConfigFileExists;

impl Check for ConfigFileExists {
  fn name(&self) -> &str {
    "config-file"
  }

  fn description(&self) -> &str {
    "Build configuration exists"
  }

  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
    if ctx.root.join(CONFIG_FILE).is_file() {
      return Ok(CheckResult::pass(self.name(), format!("found {}", CONFIG_FILE)));
    }
    Ok(CheckResult::fail(
      self.name(),
      format!("{} does not exist", CONFIG_FILE),
      Some("Run `projector repository init` or `projector repository clone` first."),
    ))
  }
}

/// The project root is inside a git repository
pub struct GitRepository;

impl Check for GitRepository {
  fn name(&self) -> &str {
    "git-repository"
  }

  fn description(&self) -> &str {
    "Project is a git repository"
  }

  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
    if ctx.root.join(".git").exists() || SystemGit::open(ctx.root).is_ok() {
      return Ok(CheckResult::pass(self.name(), "found git repository"));
    }
    Ok(CheckResult::fail(
      self.name(),
      "not a git repository",
      Some("Run `projector repository init` to create one."),
    ))
  }
}

/// `setup.py` has been generated
pub struct SetupPyExists;

impl Check for SetupPyExists {
  fn name(&self) -> &str {
    "setup-py"
  }

  fn description(&self) -> &str {
    "setup.py exists"
  }

  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
    if ctx.root.join("setup.py").is_file() {
      return Ok(CheckResult::pass(self.name(), "found setup.py"));
    }
    Ok(CheckResult::fail(
      self.name(),
      "setup.py does not exist",
      Some("Run `projector devenv build` to generate it."),
    ))
  }
}

/// The isolated interpreter has been installed
pub struct IsolatedPythonExists;

impl Check for IsolatedPythonExists {
  fn name(&self) -> &str {
    "isolated-python"
  }

  fn description(&self) -> &str {
    "Isolated python is installed"
  }

  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
    if build::isolated_python(ctx.root).exists() {
      return Ok(CheckResult::pass(self.name(), "found isolated python"));
    }
    Ok(CheckResult::fail(
      self.name(),
      "isolated python is not installed",
      Some("Run `projector devenv build --use-isolated-python` first."),
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn test_file_checks() {
    let dir = TempDir::new().unwrap();
    let ctx = CheckContext::new(dir.path());
    assert!(!ConfigFileExists.run(&ctx).unwrap().passed);
    assert!(!SetupPyExists.run(&ctx).unwrap().passed);

    fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
    fs::write(dir.path().join("setup.py"), "").unwrap();
    assert!(ConfigFileExists.run(&ctx).unwrap().passed);
    assert!(SetupPyExists.run(&ctx).unwrap().passed);
  }

  #[test]
  fn test_isolated_python_missing() {
    let dir = TempDir::new().unwrap();
    let result = IsolatedPythonExists.run(&CheckContext::new(dir.path())).unwrap();
    assert!(!result.passed);
    assert!(result.suggestion.unwrap().contains("--use-isolated-python"));
  }
}
