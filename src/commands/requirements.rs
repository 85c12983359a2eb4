//! `projector requirements`

use super::{commit_changes, flag, positional, print_items, push_changes};
use crate::checks::requires_repository;
use crate::core::build::{BuildOptions, ResolutionMode, build_environment};
use crate::core::config::{ConfigDocument, ConfigKey, Text, edit_config, keys, read_config};
use crate::core::error::{ProjectorResult, ResultExt};
use crate::editors::{ListSet, finish_config_change};
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use crate::utils;
use clap::Command;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use tracing::info;

/// File the build tool writes the picked versions to during `freeze`
pub const PICKED_VERSIONS_FILE: &str = ".versions.toml";

pub struct RequirementsPlugin;

impl CommandPlugin for RequirementsPlugin {
  fn command_name(&self) -> &str {
    "requirements"
  }

  fn grammar(&self) -> Command {
    let development = || flag("development", "requirement for the development environment only");
    Command::new("requirements")
      .about("Edit the project's requirements")
      .subcommand(Command::new("list").arg(development()))
      .subcommand(
        Command::new("add")
          .arg(positional("requirement", "requirement to add/remove"))
          .arg(development())
          .arg(commit_changes()),
      )
      .subcommand(
        Command::new("remove")
          .arg(positional("requirement", "requirement to add/remove"))
          .arg(development())
          .arg(commit_changes()),
      )
      .subcommand(
        Command::new("freeze")
          .arg(flag("newest", "always check for new package versions"))
          .arg(commit_changes())
          .arg(push_changes()),
      )
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

  fn check_preconditions(&self, ctx: &PluginContext) -> ProjectorResult<()> {
    ctx.require(&requires_repository())
  }
}

fn package_set(ctx: &PluginContext, doc: &ConfigDocument) -> ProjectorResult<ListSet> {
  if ctx.arguments.flag("--development") {
    ListSet::development_eggs(doc)
  } else {
    Ok(ListSet::install_requires())
  }
}

fn list(ctx: &PluginContext) -> ProjectorResult<()> {
  let requirements = read_config(&ctx.project.config_path(), |doc| package_set(ctx, doc)?.get(doc))?;
  print_items(requirements);
  Ok(())
}

fn add(ctx: &PluginContext) -> ProjectorResult<()> {
  let requirement = ctx.arguments.require_text("<requirement>")?;
  edit_config(&ctx.project.config_path(), |doc| package_set(ctx, doc)?.add(doc, requirement))?;
  finish_config_change(ctx, &format!("adding {} to requirements", requirement))
}

fn remove(ctx: &PluginContext) -> ProjectorResult<()> {
  let requirement = ctx.arguments.require_text("<requirement>")?;
  edit_config(&ctx.project.config_path(), |doc| package_set(ctx, doc)?.remove(doc, requirement))?;
  finish_config_change(ctx, &format!("removing {} from requirements", requirement))
}

#[derive(Debug, Default, Deserialize)]
struct PickedVersions {
  #[serde(default)]
  versions: BTreeMap<String, String>,
}

/// Versions to pin, sorted by name without regard to case, without the project itself
fn versions_to_pin(picked: PickedVersions, project: Option<&str>) -> Vec<(String, String)> {
  let mut versions: Vec<(String, String)> = picked
    .versions
    .into_iter()
    .filter(|(name, _)| project.is_none_or(|p| !name.eq_ignore_ascii_case(p)))
    .collect();
  versions.sort_by_key(|(name, _)| name.to_lowercase());
  versions
}

fn freeze(ctx: &PluginContext) -> ProjectorResult<()> {
  let picked_path = ctx.project.path(PICKED_VERSIONS_FILE);
  utils::remove_path(&picked_path)?;

  let options = BuildOptions {
    mode: if ctx.arguments.flag("--newest") {
      ResolutionMode::Newest
    } else {
      ResolutionMode::Default
    },
    extra_parameters: vec![format!("buildout:update-versions-file={}", PICKED_VERSIONS_FILE)],
    ..BuildOptions::default()
  };
  build_environment(&ctx.project, &options)?;

  let text = fs::read_to_string(&picked_path).with_context(|| format!("Failed to read {}", picked_path.display()))?;
  let picked: PickedVersions = toml_edit::de::from_str(&text)?;
  utils::remove_path(&picked_path)?;

  edit_config(&ctx.project.config_path(), |doc| {
    let project = doc.get(&keys::NAME)?;
    let versions = versions_to_pin(picked, project.as_deref());
    info!("Pinning {} packages", versions.len());
    doc.remove_section(keys::VERSIONS_SECTION);
    doc.add_section(keys::VERSIONS_SECTION);
    for (name, version) in versions {
      doc.set(&ConfigKey::<Text>::in_section(keys::VERSIONS_SECTION, name), &version);
    }
    doc.set(&keys::VERSIONS, &keys::VERSIONS_SECTION.to_string());
    Ok(())
  })?;
  finish_config_change(ctx, "Freezing dependencies")
}

fn unfreeze(ctx: &PluginContext) -> ProjectorResult<()> {
  edit_config(&ctx.project.config_path(), |doc| {
    doc.remove_section(keys::VERSIONS_SECTION);
    doc.remove(&keys::VERSIONS);
    Ok(())
  })?;
  finish_config_change(ctx, "Unfreezing dependencies")
}
