//! Command plugins
//!
//! Every top-level command (`repository`, `version`, ...) is a
//! [`CommandPlugin`]. A plugin declares its grammar as a `clap::Command`, names
//! one handler per sub-command, and may guard its handlers with preconditions.
//! The [`registry`] validates plugins, the [`dispatch`] module routes a parsed
//! command line to exactly one handler.

pub mod arguments;
pub mod dispatch;
pub mod grammar;
pub mod registry;

pub use arguments::{ArgValue, Arguments};
pub use dispatch::{DispatchOutcome, DispatchState, Dispatcher};
pub use registry::{ContractViolation, PluginRegistry};

use crate::checks::{CheckContext, Preconditions};
use crate::core::context::ProjectContext;
use crate::core::error::ProjectorResult;
use clap::Command;

/// What a handler receives: the project and the parsed command line
#[derive(Debug, Clone)]
pub struct PluginContext {
  pub project: ProjectContext,
  pub arguments: Arguments,
}

impl PluginContext {
  pub fn new(project: ProjectContext, arguments: Arguments) -> Self {
    Self { project, arguments }
  }

  /// Fail unless every check in `preconditions` passes
  pub fn require(&self, preconditions: &Preconditions) -> ProjectorResult<()> {
    preconditions.require(&CheckContext::new(&self.project.root))
  }
}

pub type HandlerFn = fn(&PluginContext) -> ProjectorResult<()>;

/// A sub-command handler, selected when the sub-command `name` was given
#[derive(Clone, Copy)]
pub struct Handler {
  pub name: &'static str,
  pub run: HandlerFn,
}

impl Handler {
  pub const fn new(name: &'static str, run: HandlerFn) -> Self {
    Self { name, run }
  }
}

impl std::fmt::Debug for Handler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Handler").field("name", &self.name).finish()
  }
}

/// Contract every command implements
pub trait CommandPlugin: Send + Sync {
  /// Top-level sub-command this plugin answers to
  fn command_name(&self) -> &str;

  /// Usage grammar; its name must equal [`CommandPlugin::command_name`]
  fn grammar(&self) -> Command;

  /// One handler per sub-command of the grammar
  fn handlers(&self) -> Vec<Handler>;

  /// Guards run before any handler
  fn check_preconditions(&self, _ctx: &PluginContext) -> ProjectorResult<()> {
    Ok(())
  }
}
