//! Project context - built once per invocation, passed to every handler
//!
//! Operations never change the process working directory. Everything that
//! touches the project receives its root through [`ProjectContext`].

use crate::core::build::BuildTool;
use crate::core::config::CONFIG_FILE;
use crate::core::error::ProjectorResult;
use crate::core::process::CommandRunner;
use crate::core::vcs::{BranchLayout, SystemGit};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the project lives and which collaborators act on it
#[derive(Clone)]
pub struct ProjectContext {
  /// Project root directory
  pub root: PathBuf,

  pub layout: BranchLayout,

  /// Runs the build tool and other external programs
  pub runner: Arc<dyn CommandRunner>,
}

impl ProjectContext {
  pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
    Self {
      root: root.into(),
      layout: BranchLayout::default(),
      runner,
    }
  }

  /// Same collaborators, different project root
  pub fn with_root(&self, root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      layout: self.layout.clone(),
      runner: Arc::clone(&self.runner),
    }
  }

  pub fn config_path(&self) -> PathBuf {
    self.root.join(CONFIG_FILE)
  }

  pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.root.join(relative)
  }

  /// Open the project's git repository
  pub fn git(&self) -> ProjectorResult<SystemGit> {
    SystemGit::open(&self.root)
  }

  pub fn build_tool(&self) -> BuildTool<'_> {
    BuildTool::new(&self.root, self.runner.as_ref())
  }
}

impl std::fmt::Debug for ProjectContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProjectContext")
      .field("root", &self.root)
      .field("layout", &self.layout)
      .finish_non_exhaustive()
  }
}
