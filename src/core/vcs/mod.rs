//! Version control abstraction
//!
//! The release workflow only talks to [`Vcs`]. [`SystemGit`] implements it by
//! shelling out to the system `git` binary; tests use an in-memory fake.

pub mod system_git;
mod system_git_ops;

#[cfg(test)]
pub(crate) mod fake;

pub use system_git::SystemGit;

use crate::core::error::ProjectorResult;
use std::collections::BTreeSet;
use std::path::Path;

/// Branch and remote naming conventions of a projector repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchLayout {
  /// Receives release merges and carries release tags
  pub stable: String,
  /// Day-to-day development happens here
  pub integration: String,
  pub remote: String,
}

impl BranchLayout {
  /// Tags carrying this suffix mark integration-branch versions, not releases
  pub fn integration_tag_suffix(&self) -> String {
    format!("-{}", self.integration)
  }

  pub fn long_lived(&self) -> [&str; 2] {
    [&self.stable, &self.integration]
  }
}

impl Default for BranchLayout {
  fn default() -> Self {
    Self {
      stable: "master".to_string(),
      integration: "develop".to_string(),
      remote: "origin".to_string(),
    }
  }
}

/// Repository operations used by preconditions and the release workflow
pub trait Vcs {
  /// `None` when HEAD is detached
  fn current_branch(&self) -> ProjectorResult<Option<String>>;

  fn branches(&self) -> ProjectorResult<BTreeSet<String>>;

  fn tags(&self) -> ProjectorResult<BTreeSet<String>>;

  /// Commit a local branch points to, `None` if the branch does not exist
  fn branch_head(&self, branch: &str) -> ProjectorResult<Option<String>>;

  fn checkout(&self, rev: &str) -> ProjectorResult<()>;

  /// Abandon any merge in progress and switch to `branch`, discarding local changes
  fn force_checkout(&self, branch: &str) -> ProjectorResult<()>;

  /// Merge `branch` into the current branch
  fn merge(&self, branch: &str, no_ff: bool, message: Option<&str>) -> ProjectorResult<()>;

  /// Create an annotated tag at HEAD
  fn create_tag(&self, name: &str, message: &str) -> ProjectorResult<()>;

  fn delete_tag(&self, name: &str) -> ProjectorResult<()>;

  fn delete_branch(&self, name: &str) -> ProjectorResult<()>;

  /// Check out `branch` and move it to `commit`, discarding local changes
  fn reset_branch(&self, branch: &str, commit: &str) -> ProjectorResult<()>;

  fn fetch(&self, remote: &str) -> ProjectorResult<()>;

  fn push_branches(&self, remote: &str) -> ProjectorResult<()>;

  fn push_tags(&self, remote: &str) -> ProjectorResult<()>;

  fn is_ancestor(&self, ancestor: &str, descendant: &str) -> ProjectorResult<bool>;

  /// Remote-tracking branch configured for `branch`, e.g. `origin/master`
  fn upstream(&self, branch: &str) -> ProjectorResult<Option<String>>;

  /// Output of `git describe --tags` for HEAD
  fn describe(&self) -> ProjectorResult<String>;

  /// Modified or staged tracked files; untracked files do not count
  fn has_uncommitted_changes(&self) -> ProjectorResult<bool>;

  /// Whether `path` differs from HEAD (modified, staged or untracked)
  fn is_modified(&self, path: &Path) -> ProjectorResult<bool>;
}
