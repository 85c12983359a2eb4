//! `projector submodule`

use super::{commit_changes, flag, positional, print_items};
use crate::checks::requires_repository;
use crate::core::build::{GIT_RECIPES, is_git_recipe};
use crate::core::config::{ConfigDocument, ConfigKey, Text, edit_config, keys, read_config};
use crate::core::error::ProjectorResult;
use crate::editors::{ListSet, finish_config_change};
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use clap::Command;
use tracing::info;

pub struct SubmodulePlugin;

impl CommandPlugin for SubmodulePlugin {
  fn command_name(&self) -> &str {
    "submodule"
  }

  fn grammar(&self) -> Command {
    Command::new("submodule")
      .about("Edit the git submodules the build tool checks out")
      .subcommand(Command::new("list"))
      .subcommand(
        Command::new("add")
          .arg(positional("name", "name of submodule to add/remove"))
          .arg(positional("repository", "remote repository url"))
          .arg(positional(
            "rev",
            "remote branch name (must start with origin) or commit hash, e.g. origin/master",
          ))
          .arg(commit_changes())
          .arg(flag(
            "use-setup-py",
            "add the setup.py of the submodule to the buildout environment",
          )),
      )
      .subcommand(
        Command::new("remove")
          .arg(positional("name", "name of submodule to add/remove"))
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

fn text_key(section: &str, key: &'static str) -> ConfigKey<Text> {
  ConfigKey::in_section(section, key)
}

fn develop() -> ListSet {
  ListSet::new(keys::DEVELOP)
}

/// Add or update the submodule section `name`
pub fn add_submodule(
  doc: &mut ConfigDocument,
  name: &str,
  repository: &str,
  rev: &str,
  use_setup_py: bool,
) -> ProjectorResult<()> {
  doc.set(&keys::recipe(name), &GIT_RECIPES[0].to_string());
  doc.set(&text_key(name, "repository"), &repository.to_string());
  doc.set(&text_key(name, "rev"), &rev.to_string());
  doc.set(&text_key(name, "newest"), &"true".to_string());
  if use_setup_py {
    develop().add(doc, name)?;
  }
  Ok(())
}

/// Remove the submodule section `name`; other sections are left alone
pub fn remove_submodule(doc: &mut ConfigDocument, name: &str) -> ProjectorResult<bool> {
  if !doc.sections_with_recipe(is_git_recipe).iter().any(|s| s == name) {
    return Ok(false);
  }
  doc.remove_section(name);
  develop().remove(doc, name)?;
  Ok(true)
}

fn list(ctx: &PluginContext) -> ProjectorResult<()> {
  let sections = read_config(&ctx.project.config_path(), |doc| Ok(doc.sections_with_recipe(is_git_recipe)))?;
  print_items(sections);
  Ok(())
}

fn add(ctx: &PluginContext) -> ProjectorResult<()> {
  let name = ctx.arguments.require_text("<name>")?;
  let repository = ctx.arguments.require_text("<repository>")?;
  let rev = ctx.arguments.require_text("<rev>")?;
  let use_setup_py = ctx.arguments.flag("--use-setup-py");
  edit_config(&ctx.project.config_path(), |doc| {
    add_submodule(doc, name, repository, rev, use_setup_py)
  })?;
  finish_config_change(ctx, &format!("Adding git submodule {}", name))
}

fn remove(ctx: &PluginContext) -> ProjectorResult<()> {
  let name = ctx.arguments.require_text("<name>")?;
  let removed = edit_config(&ctx.project.config_path(), |doc| remove_submodule(doc, name))?;
  if !removed {
    info!("{} is not a submodule", name);
  }
  finish_config_change(ctx, &format!("Removing git submodule {}", name))
}
