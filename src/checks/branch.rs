//! Checks on repository state

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::ProjectorResult;

/// HEAD is on a specific branch
pub struct OnBranch {
  name: String,
  branch: String,
}

impl OnBranch {
  pub fn new(branch: impl Into<String>) -> Self {
    let branch = branch.into();
    Self {
      name: format!("on-branch-{}", branch),
      branch,
    }
  }
}

impl Check for OnBranch {
  fn name(&self) -> &str {
    &self.name
  }

  fn description(&self) -> &str {
    "Current branch matches"
  }

  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
    let current = ctx.with_repository(|vcs| vcs.current_branch())?;
    if current.as_deref() == Some(self.branch.as_str()) {
      return Ok(CheckResult::pass(self.name(), format!("on branch {}", self.branch)));
    }
    Ok(CheckResult::fail(
      self.name(),
      format!(
        "not on branch {} (currently on {})",
        self.branch,
        current.as_deref().unwrap_or("a detached HEAD")
      ),
      Some(format!("Run `git checkout {}` first.", self.branch)),
    ))
  }
}

/// The working tree has no uncommitted changes
pub struct CleanWorkingTree;

impl Check for CleanWorkingTree {
  fn name(&self) -> &str {
    "clean-working-tree"
  }

  fn description(&self) -> &str {
    "No uncommitted changes"
  }

  fn run(&self, ctx: &CheckContext) -> ProjectorResult<CheckResult> {
    if !ctx.with_repository(|vcs| vcs.has_uncommitted_changes())? {
      return Ok(CheckResult::pass(self.name(), "working tree is clean"));
    }
    Ok(CheckResult::fail(
      self.name(),
      "working tree has uncommitted changes",
      Some("Commit or stash them first."),
    ))
  }
}
