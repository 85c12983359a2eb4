//! `projector js-requirements`

use super::{commit_changes, positional, print_items, push_changes};
use crate::core::build::JS_REQUIREMENTS_RECIPE;
use crate::core::config::{ConfigDocument, ConfigKey, Text, edit_config, keys, read_config};
use crate::core::error::{ProjectorError, ProjectorResult};
use crate::editors::{ListSet, finish_config_change};
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use clap::Command;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Where the js recipe installs packages when `js-directory` is empty
pub const DEFAULT_JS_DIRECTORY: &str = "parts/js/";

/// Lock file the js recipe writes next to the installed packages
pub const PACKAGE_LOCK_FILE: &str = ".package-lock.json";

pub struct JsRequirementsPlugin;

impl CommandPlugin for JsRequirementsPlugin {
  fn command_name(&self) -> &str {
    "js-requirements"
  }

  fn grammar(&self) -> Command {
    Command::new("js-requirements")
      .about("Edit the project's javascript requirements")
      .subcommand(Command::new("list"))
      .subcommand(
        Command::new("add")
          .arg(positional("requirement", "requirement to add/remove"))
          .arg(commit_changes()),
      )
      .subcommand(
        Command::new("remove")
          .arg(positional("requirement", "requirement to add/remove"))
          .arg(commit_changes()),
      )
      .subcommand(Command::new("freeze").arg(commit_changes()).arg(push_changes()))
      .subcommand(Command::new("unfreeze").arg(commit_changes()).arg(push_changes()))
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![
      Handler::new("list", list),
      Handler::new("add", add),
      Handler::new("remove", remove),
      Handler::new("freeze", freeze),
      Handler::new("unfreeze", unfreeze),
    ]
  }
}

/// `.package-lock.json`: package name to installed version
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
struct PackageLock(BTreeMap<String, String>);

impl PackageLock {
  fn load(path: &Path) -> ProjectorResult<Self> {
    let text = fs::read_to_string(path).map_err(|err| {
      ProjectorError::with_help(
        format!("Failed to read {}: {}", path.display(), err),
        "try running projector devenv build to create the file",
      )
    })?;
    Ok(serde_json::from_str(&text)?)
  }

  fn sorted(self) -> Vec<(String, String)> {
    let mut versions: Vec<(String, String)> = self.0.into_iter().collect();
    versions.sort_by_key(|(name, _)| name.to_lowercase());
    versions
  }
}

fn sorted_ignoring_case(mut items: Vec<String>) -> Vec<String> {
  items.sort_by_key(|item| item.to_lowercase());
  items
}

/// Create the js-requirements section with an empty package list
fn ensure_section(doc: &mut ConfigDocument) {
  if doc.has_section(keys::JS_REQUIREMENTS_SECTION) {
    return;
  }
  doc.add_section(keys::JS_REQUIREMENTS_SECTION);
  doc.set(&keys::recipe(keys::JS_REQUIREMENTS_SECTION), &JS_REQUIREMENTS_RECIPE.to_string());
  doc.set(&keys::JS_DIRECTORY, &String::new());
  doc.set(
    &ConfigKey::<Text>::new(keys::JS_REQUIREMENTS_SECTION, "symlink-to-directory"),
    &"parts/js".to_string(),
  );
  doc.set(&keys::JS_PACKAGES, &Vec::new());
}

fn list(ctx: &PluginContext) -> ProjectorResult<()> {
  let packages = read_config(&ctx.project.config_path(), |doc| ListSet::js_packages().get(doc))?;
  if packages.is_empty() {
    println!("Please initiate js-requirements first by using \"add\" argument.");
  } else {
    print_items(sorted_ignoring_case(packages));
  }
  Ok(())
}

fn add(ctx: &PluginContext) -> ProjectorResult<()> {
  let requirement = ctx.arguments.require_text("<requirement>")?;
  edit_config(&ctx.project.config_path(), |doc| {
    ensure_section(doc);
    ListSet::js_packages().add(doc, requirement)
  })?;
  finish_config_change(ctx, &format!("adding {} to js-requirements", requirement))
}

fn remove(ctx: &PluginContext) -> ProjectorResult<()> {
  let requirement = ctx.arguments.require_text("<requirement>")?;
  edit_config(&ctx.project.config_path(), |doc| ListSet::js_packages().remove(doc, requirement))?;
  finish_config_change(ctx, &format!("remove {} from js-requirements", requirement))
}

fn has_js_section(ctx: &PluginContext) -> ProjectorResult<bool> {
  let present = read_config(&ctx.project.config_path(), |doc| Ok(doc.has_section(keys::JS_REQUIREMENTS_SECTION)))?;
  if !present {
    println!("Missing js-requirements section");
  }
  Ok(present)
}

fn freeze(ctx: &PluginContext) -> ProjectorResult<()> {
  if !has_js_section(ctx)? {
    return Ok(());
  }
  edit_config(&ctx.project.config_path(), |doc| {
    let directory = doc
      .get(&keys::JS_DIRECTORY)?
      .filter(|d| !d.is_empty())
      .unwrap_or_else(|| DEFAULT_JS_DIRECTORY.to_string());
    let lock = PackageLock::load(&ctx.project.path(directory).join(PACKAGE_LOCK_FILE))?;
    doc.remove_section(keys::JS_VERSIONS_SECTION);
    doc.add_section(keys::JS_VERSIONS_SECTION);
    for (name, version) in lock.sorted() {
      doc.set(&ConfigKey::<Text>::in_section(keys::JS_VERSIONS_SECTION, name), &version);
    }
    doc.set(&keys::JS_VERSIONS, &true);
    Ok(())
  })?;
  finish_config_change(ctx, "Freezing javascript dependencies")
}

fn unfreeze(ctx: &PluginContext) -> ProjectorResult<()> {
  if !has_js_section(ctx)? {
    return Ok(());
  }
  edit_config(&ctx.project.config_path(), |doc| {
    doc.remove(&keys::JS_VERSIONS);
    doc.remove_section(keys::JS_VERSIONS_SECTION);
    Ok(())
  })?;
  finish_config_change(ctx, "Unfreezing javascript dependencies")
}
