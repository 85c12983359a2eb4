//! `projector package-data`

use super::{commit_changes, positional, print_items};
use crate::checks::requires_repository;
use crate::core::config::{edit_config, read_config};
use crate::core::error::{ProjectorResult, ResultExt};
use crate::editors::{ListSet, finish_config_change};
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use clap::Command;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "MANIFEST.in";

pub struct PackageDataPlugin;

impl CommandPlugin for PackageDataPlugin {
  fn command_name(&self) -> &str {
    "package-data"
  }

  fn grammar(&self) -> Command {
    Command::new("package-data")
      .about("Edit the data files shipped with the package")
      .subcommand(Command::new("list"))
      .subcommand(
        Command::new("add")
          .arg(positional("filename", "file pattern under src/"))
          .arg(commit_changes()),
      )
      .subcommand(
        Command::new("remove")
          .arg(positional("filename", "file pattern under src/"))
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

/// Rewrite `MANIFEST.in` to include `files` from `src`
pub fn write_manifest(root: &Path, files: &[String]) -> ProjectorResult<()> {
  let path = root.join(MANIFEST_FILE);
  fs::write(&path, format!("recursive-include src {}\n", files.join(" ")))
    .with_context(|| format!("Failed to write {}", path.display()))
}

fn list(ctx: &PluginContext) -> ProjectorResult<()> {
  let files = read_config(&ctx.project.config_path(), |doc| ListSet::package_data().get(doc))?;
  print_items(files);
  Ok(())
}

fn edit(ctx: &PluginContext, adding: bool) -> ProjectorResult<String> {
  let filename = ctx.arguments.require_text("<filename>")?;
  let set = ListSet::package_data();
  let files = edit_config(&ctx.project.config_path(), |doc| {
    if adding {
      set.add(doc, filename)?;
    } else {
      set.remove(doc, filename)?;
    }
    set.get(doc)
  })?;
  write_manifest(&ctx.project.root, &files)?;
  Ok(filename.to_string())
}

fn add(ctx: &PluginContext) -> ProjectorResult<()> {
  let filename = edit(ctx, true)?;
  finish_config_change(ctx, &format!("adding {} to package data", filename))
}

fn remove(ctx: &PluginContext) -> ProjectorResult<()> {
  let filename = edit(ctx, false)?;
  finish_config_change(ctx, &format!("removing {} from package data", filename))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_manifest_lists_every_pattern() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), &["*.json".to_string(), "static/*".to_string()]).unwrap();
    assert_eq!(
      fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap(),
      "recursive-include src *.json static/*\n"
    );
  }
}
