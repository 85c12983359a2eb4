//! Precondition runner

use super::branch::{CleanWorkingTree, OnBranch};
use super::project::{ConfigFileExists, GitRepository, IsolatedPythonExists, SetupPyExists};
use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::{PreconditionError, ProjectorResult};
use std::sync::Arc;
use tracing::debug;

/// An ordered set of checks that must all pass
#[derive(Clone, Default)]
pub struct Preconditions {
  checks: Vec<Arc<dyn Check>>,
}

impl Preconditions {
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  /// Add a check; checks run in insertion order
  pub fn with(mut self, check: impl Check + 'static) -> Self {
    self.checks.push(Arc::new(check));
    self
  }

  /// Run every check and collect results
  pub fn run_all(&self, ctx: &CheckContext) -> Vec<CheckResult> {
    self
      .checks
      .iter()
      .map(|check| match check.run(ctx) {
        Ok(result) => result,
        Err(err) => CheckResult::fail(
          check.name(),
          format!("{} could not be verified: {}", check.description(), err),
          None::<String>,
        ),
      })
      .collect()
  }

  /// Fail with the first check that does not pass
  ///
  /// Later checks are not run once one fails.
  pub fn require(&self, ctx: &CheckContext) -> ProjectorResult<()> {
    for check in &self.checks {
      let result = check.run(ctx)?;
      debug!(check = check.name(), passed = result.passed, "{}", result.message);
      if !result.passed {
        return Err(
          PreconditionError {
            check: result.check_name,
            message: result.message,
            help: result.suggestion,
          }
          .into(),
        );
      }
    }
    Ok(())
  }

  pub fn checks(&self) -> &[Arc<dyn Check>] {
    &self.checks
  }
}

/// Build configuration and git repository are present
pub fn requires_repository() -> Preconditions {
  Preconditions::new().with(ConfigFileExists).with(GitRepository)
}

/// A repository whose `setup.py` has been generated
pub fn requires_built_repository() -> Preconditions {
  requires_repository().with(SetupPyExists)
}

/// A built repository, on `branch`, without uncommitted changes
pub fn requires_release_ready(branch: &str) -> Preconditions {
  requires_built_repository().with(OnBranch::new(branch)).with(CleanWorkingTree)
}

/// A repository whose isolated interpreter has been installed
pub fn requires_isolated_python() -> Preconditions {
  requires_repository().with(IsolatedPythonExists)
}
