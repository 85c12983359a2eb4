//! Rollback transaction around repository mutations
//!
//! A snapshot of tags, branches and the long-lived branch heads is taken
//! before the block runs. If the block fails, everything it created is
//! deleted and both long-lived branches are reset to their recorded heads.

use crate::core::error::{GitError, ProjectorError, ProjectorResult};
use crate::core::vcs::{BranchLayout, Vcs};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

/// Tags, branches and long-lived branch heads at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
  pub tags: BTreeSet<String>,
  pub branches: BTreeSet<String>,
  pub heads: BTreeMap<String, String>,
}

impl RepositorySnapshot {
  pub fn capture(vcs: &dyn Vcs, layout: &BranchLayout) -> ProjectorResult<Self> {
    let mut heads = BTreeMap::new();
    for branch in layout.long_lived() {
      let head = vcs
        .branch_head(branch)?
        .ok_or_else(|| GitError::RefNotFound { name: branch.to_string() })?;
      heads.insert(branch.to_string(), head);
    }
    Ok(Self {
      tags: vcs.tags()?,
      branches: vcs.branches()?,
      heads,
    })
  }
}

/// Run `block`, restoring the repository to its prior state if it fails
///
/// With `keep_leftovers` a failure leaves the repository as the block left
/// it. The block's error is returned unchanged either way.
pub fn run_transaction<T>(
  vcs: &dyn Vcs,
  layout: &BranchLayout,
  keep_leftovers: bool,
  block: impl FnOnce() -> ProjectorResult<T>,
) -> ProjectorResult<T> {
  let before = RepositorySnapshot::capture(vcs, layout)?;
  debug!(tags = before.tags.len(), branches = before.branches.len(), "snapshot taken");

  match block() {
    Ok(value) => Ok(value),
    Err(err) if keep_leftovers => {
      warn!("Keeping leftovers after failure: {}", err);
      Err(err)
    }
    Err(err) => {
      info!("Rolling back repository changes");
      for cleanup in roll_back(vcs, layout, &before) {
        error!("Rollback failed: {}", cleanup);
      }
      Err(err)
    }
  }
}

/// Undo everything since `before`; returns the steps that failed
///
/// A failed step does not stop the remaining ones.
fn roll_back(vcs: &dyn Vcs, layout: &BranchLayout, before: &RepositorySnapshot) -> Vec<ProjectorError> {
  let mut failures = Vec::new();
  let mut attempt = |result: ProjectorResult<()>| {
    if let Err(err) = result {
      failures.push(err);
    }
  };

  attempt(vcs.force_checkout(&layout.integration));
  match vcs.tags() {
    Ok(tags) => {
      for tag in tags.difference(&before.tags) {
        debug!("Deleting tag {}", tag);
        attempt(vcs.delete_tag(tag));
      }
    }
    Err(err) => attempt(Err(err)),
  }
  match vcs.branches() {
    Ok(branches) => {
      for branch in branches.difference(&before.branches) {
        debug!("Deleting branch {}", branch);
        attempt(vcs.delete_branch(branch));
      }
    }
    Err(err) => attempt(Err(err)),
  }
  for branch in layout.long_lived() {
    if let Some(head) = before.heads.get(branch) {
      attempt(vcs.reset_branch(branch, head));
    }
  }
  failures
}
