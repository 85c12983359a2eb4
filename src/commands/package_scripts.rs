//! `projector package-scripts`

use super::{commit_changes, flag, positional};
use crate::checks::requires_repository;
use crate::core::config::{ConfigKey, Text, edit_config, keys, read_config};
use crate::core::error::{DispatchError, ProjectorResult};
use crate::editors::finish_config_change;
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use clap::{ArgGroup, Command};

pub struct PackageScriptsPlugin;

impl CommandPlugin for PackageScriptsPlugin {
  fn command_name(&self) -> &str {
    "package-scripts"
  }

  fn grammar(&self) -> Command {
    let hooks = || {
      [
        flag("post-install", "script run after the package is installed"),
        flag("pre-uninstall", "script run before the package is removed"),
      ]
    };
    let group = || {
      ArgGroup::new("hook")
        .args(["post-install", "pre-uninstall"])
        .required(true)
    };
    Command::new("package-scripts")
      .about("Edit the package's install hooks")
      .subcommand(Command::new("show").args(hooks()).group(group()))
      .subcommand(
        Command::new("set")
          .arg(positional(
            "value",
            "the executable basename, under the 'bin' directory (e.g. projector). Set None to disable.",
          ))
          .args(hooks())
          .group(group())
          .arg(commit_changes()),
      )
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![Handler::new("show", show), Handler::new("set", set)]
  }

  fn check_preconditions(&self, ctx: &PluginContext) -> ProjectorResult<()> {
    ctx.require(&requires_repository())
  }
}

fn hook_key(ctx: &PluginContext) -> ProjectorResult<ConfigKey<Text>> {
  if ctx.arguments.flag("--post-install") {
    Ok(keys::POST_INSTALL_SCRIPT)
  } else if ctx.arguments.flag("--pre-uninstall") {
    Ok(keys::PRE_UNINSTALL_SCRIPT)
  } else {
    Err(DispatchError::Usage("one of --post-install or --pre-uninstall is required".to_string()).into())
  }
}

fn show(ctx: &PluginContext) -> ProjectorResult<()> {
  let key = hook_key(ctx)?;
  let value = read_config(&ctx.project.config_path(), |doc| doc.get(&key))?;
  println!("{}", value.as_deref().unwrap_or("None"));
  Ok(())
}

fn set(ctx: &PluginContext) -> ProjectorResult<()> {
  let key = hook_key(ctx)?;
  let value = ctx.arguments.require_text("<value>")?.to_string();
  edit_config(&ctx.project.config_path(), |doc| {
    doc.set(&key, &value);
    Ok(())
  })?;
  finish_config_change(ctx, &format!("setting {} to {}", key.key(), value))
}
