//! Command dispatcher
//!
//! ```text
//! Idle -> ParsedArgs -> PluginsSelected -> PreconditionsChecked -> HandlerInvoked
//!              \               \                  \
//!               `---------------`------------------`--> Rejected
//! ```
//!
//! `--version` and `--help` end the run right after parsing.

use super::arguments::{self, Arguments};
use super::grammar::{self, VERSION_FLAG};
use super::registry::PluginRegistry;
use super::{CommandPlugin, PluginContext};
use crate::core::context::ProjectContext;
use crate::core::error::{DispatchError, ProjectorResult};
use clap::Command;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
  Idle,
  ParsedArgs,
  PluginsSelected,
  PreconditionsChecked,
  HandlerInvoked,
  Rejected,
}

/// How a successful dispatch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
  VersionShown,
  HelpShown,
  Invoked { plugin: String, handler: String },
}

pub struct Dispatcher<'r> {
  registry: &'r PluginRegistry,
  project: ProjectContext,
  defaults_files: Vec<PathBuf>,
  version: &'static str,
  state: DispatchState,
}

impl<'r> Dispatcher<'r> {
  pub fn new(registry: &'r PluginRegistry, project: ProjectContext) -> Self {
    let defaults_files = arguments::default_files(&project.root);
    Self {
      registry,
      project,
      defaults_files,
      version: env!("CARGO_PKG_VERSION"),
      state: DispatchState::Idle,
    }
  }

  /// Replace the defaults files consulted after parsing
  pub fn with_defaults_files(mut self, files: Vec<PathBuf>) -> Self {
    self.defaults_files = files;
    self
  }

  pub fn state(&self) -> DispatchState {
    self.state
  }

  fn transition(&mut self, state: DispatchState) {
    debug!(from = ?self.state, to = ?state, "dispatch");
    self.state = state;
  }

  fn reject<T>(&mut self, err: impl Into<crate::core::error::ProjectorError>) -> ProjectorResult<T> {
    self.transition(DispatchState::Rejected);
    Err(err.into())
  }

  /// Root command with every registered grammar mounted
  pub fn command(&self) -> Command {
    let grammars = self.registry.plugins().iter().map(|p| p.grammar()).collect();
    let mut command = grammar::root_command(self.version, grammars).disable_help_subcommand(true);
    command.build();
    command
  }

  /// Usage text covering every registered plugin
  pub fn help(&self) -> String {
    self.command().render_help().to_string()
  }

  pub fn dispatch<I, T>(&mut self, argv: I) -> ProjectorResult<DispatchOutcome>
  where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
  {
    let command = self.command();
    let matches = match command.clone().try_get_matches_from(argv) {
      Ok(matches) => matches,
      Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
        println!("{}", err.render().ansi());
        self.transition(DispatchState::ParsedArgs);
        return Ok(DispatchOutcome::HelpShown);
      }
      Err(err) => {
        let message = err.render().to_string();
        return self.reject(DispatchError::Usage(message.trim().to_string()));
      }
    };
    self.transition(DispatchState::ParsedArgs);

    if matches.get_flag(VERSION_FLAG) {
      println!("{}", self.version);
      return Ok(DispatchOutcome::VersionShown);
    }

    let mut arguments = grammar::flatten(&command, &matches);
    let selected: Vec<Arc<dyn CommandPlugin>> = self
      .registry
      .plugins()
      .into_iter()
      .filter(|p| arguments.is_set(p.command_name()))
      .collect();
    if selected.is_empty() {
      error!("No matching plugin found");
      return self.reject(DispatchError::NoMatchingPlugin);
    }
    self.transition(DispatchState::PluginsSelected);

    arguments.merge_defaults(arguments::load_defaults(&self.defaults_files));

    let mut outcome = None;
    for plugin in selected {
      let ctx = PluginContext::new(self.project.clone(), arguments.clone());
      if let Err(err) = plugin.check_preconditions(&ctx) {
        return self.reject(err);
      }
      self.transition(DispatchState::PreconditionsChecked);

      let Some(handler) = find_handler(plugin.as_ref(), &arguments) else {
        error!("No matching method found for {}", plugin.command_name());
        return self.reject(DispatchError::NoMatchingHandler {
          plugin: plugin.command_name().to_string(),
        });
      };
      debug!(plugin = plugin.command_name(), handler = handler.name, "invoking");
      if let Err(err) = (handler.run)(&ctx) {
        return self.reject(err);
      }
      self.transition(DispatchState::HandlerInvoked);
      outcome = Some(DispatchOutcome::Invoked {
        plugin: plugin.command_name().to_string(),
        handler: handler.name.to_string(),
      });
    }
    outcome.map_or_else(|| self.reject(DispatchError::NoMatchingPlugin), Ok)
  }
}

fn find_handler(plugin: &dyn CommandPlugin, arguments: &Arguments) -> Option<super::Handler> {
  plugin.handlers().into_iter().find(|h| arguments.is_set(h.name))
}
