//! `projector console-scripts` and `projector gui-scripts`

use super::{commit_changes, positional};
use crate::checks::requires_repository;
use crate::core::config::{edit_config, read_config};
use crate::core::error::ProjectorResult;
use crate::editors::{EntryPointSet, finish_config_change};
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use clap::Command;

const CONSOLE: &str = "console-scripts";
const GUI: &str = "gui-scripts";

/// Entry-point editor, registered once per script kind
pub struct ScriptsPlugin {
  command: &'static str,
}

impl ScriptsPlugin {
  pub fn console() -> Self {
    Self { command: CONSOLE }
  }

  pub fn gui() -> Self {
    Self { command: GUI }
  }
}

impl CommandPlugin for ScriptsPlugin {
  fn command_name(&self) -> &str {
    self.command
  }

  fn grammar(&self) -> Command {
    Command::new(self.command)
      .about("Edit the project's entry points")
      .subcommand(Command::new("list"))
      .subcommand(
        Command::new("add")
          .arg(positional("script-name", "name of the script"))
          .arg(positional("entry-point", "module:function to run, e.g. infi.hello:main"))
          .arg(commit_changes()),
      )
      .subcommand(
        Command::new("remove")
          .arg(positional("script-name", "name of the script"))
          .arg(commit_changes()),
      )
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![
      Handler::new("list", list),
      Handler::new("add", add),
      Handler::new("remove", remove),
    ]
  }

  fn check_preconditions(&self, ctx: &PluginContext) -> ProjectorResult<()> {
    ctx.require(&requires_repository())
  }
}

fn entry_points(ctx: &PluginContext) -> (EntryPointSet, &'static str) {
  if ctx.arguments.flag(GUI) {
    (EntryPointSet::gui_scripts(), "gui script")
  } else {
    (EntryPointSet::console_scripts(), "console script")
  }
}

fn list(ctx: &PluginContext) -> ProjectorResult<()> {
  let (set, _) = entry_points(ctx);
  let scripts = read_config(&ctx.project.config_path(), |doc| set.get(doc))?;
  for (name, entry_point) in scripts {
    println!("{} = {}", name, entry_point);
  }
  Ok(())
}

fn add(ctx: &PluginContext) -> ProjectorResult<()> {
  let (set, kind) = entry_points(ctx);
  let name = ctx.arguments.require_text("<script-name>")?;
  let entry_point = ctx.arguments.require_text("<entry-point>")?;
  edit_config(&ctx.project.config_path(), |doc| set.insert(doc, name, entry_point))?;
  finish_config_change(ctx, &format!("adding {} {}", kind, name))
}

fn remove(ctx: &PluginContext) -> ProjectorResult<()> {
  let (set, kind) = entry_points(ctx);
  let name = ctx.arguments.require_text("<script-name>")?;
  edit_config(&ctx.project.config_path(), |doc| set.remove(doc, name))?;
  finish_config_change(ctx, &format!("removing {} {}", kind, name))
}
