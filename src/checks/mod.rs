//! Command preconditions
//!
//! Guards a plugin requires before its handler runs. Each guard implements
//! [`Check`]; plugins compose them with [`Preconditions`] or use one of the
//! ready-made sets:
//!
//! - **requires_repository**: build configuration and git repository exist
//! - **requires_built_repository**: also `setup.py`
//! - **requires_release_ready**: also on the integration branch with a clean tree
//! - **requires_isolated_python**: the isolated interpreter is installed

mod branch;
mod project;
mod runner;
mod trait_def;

pub use branch::{CleanWorkingTree, OnBranch};
pub use project::{ConfigFileExists, GitRepository, IsolatedPythonExists, SetupPyExists};
pub use runner::{
  Preconditions, requires_built_repository, requires_isolated_python, requires_release_ready, requires_repository,
};
pub use trait_def::{Check, CheckContext, CheckResult};
