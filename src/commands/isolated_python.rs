//! `projector isolated-python`

use super::{commit_changes, positional};
use crate::checks::requires_repository;
use crate::core::build::PYTHON_RECIPE;
use crate::core::config::{ConfigDocument, edit_config, keys, read_config};
use crate::core::error::{ConfigError, ProjectorResult};
use crate::editors::finish_config_change;
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use clap::Command;

pub struct IsolatedPythonPlugin;

impl CommandPlugin for IsolatedPythonPlugin {
  fn command_name(&self) -> &str {
    "isolated-python"
  }

  fn grammar(&self) -> Command {
    Command::new("isolated-python")
      .about("Select the version of the isolated interpreter")
      .subcommand(
        Command::new("python-version")
          .subcommand_required(true)
          .subcommand(Command::new("get"))
          .subcommand(
            Command::new("set")
              .arg(positional("version", "python version, e.g. v2.7.8.8"))
              .arg(commit_changes()),
          ),
      )
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![Handler::new("python-version", python_version)]
  }

  fn check_preconditions(&self, ctx: &PluginContext) -> ProjectorResult<()> {
    ctx.require(&requires_repository())
  }
}

/// Versions are stored with a leading `v`
pub fn normalize_version(version: &str) -> String {
  if version.starts_with('v') {
    version.to_string()
  } else {
    format!("v{}", version)
  }
}

fn current_version(doc: &ConfigDocument) -> ProjectorResult<String> {
  let section = doc.section_by_recipe(PYTHON_RECIPE)?;
  let key = keys::python_version(&section);
  doc.get(&key)?.ok_or_else(|| {
    ConfigError::MissingKey {
      section: section.clone(),
      key: key.key().to_string(),
    }
    .into()
  })
}

fn python_version(ctx: &PluginContext) -> ProjectorResult<()> {
  if ctx.arguments.flag("get") {
    let version = read_config(&ctx.project.config_path(), current_version)?;
    println!("{}", version);
    return Ok(());
  }

  let version = normalize_version(ctx.arguments.require_text("<version>")?);
  edit_config(&ctx.project.config_path(), |doc| {
    let section = doc.section_by_recipe(PYTHON_RECIPE)?;
    doc.set(&keys::python_version(&section), &version);
    Ok(())
  })?;
  finish_config_change(ctx, &format!("changed isolated python version to {}", version))
}
