//! Committing and pushing configuration edits

use crate::core::config::CONFIG_FILE;
use crate::core::context::ProjectContext;
use crate::core::error::ProjectorResult;
use crate::core::vcs::Vcs;
use crate::plugin::PluginContext;
use std::path::Path;
use tracing::{debug, info};

/// Commit `buildout.toml` with `<file>: <message>` if it differs from HEAD
///
/// Returns whether a commit was made.
pub fn commit_config_changes(ctx: &ProjectContext, message: &str) -> ProjectorResult<bool> {
  let git = ctx.git()?;
  if !git.is_modified(Path::new(CONFIG_FILE))? {
    debug!("{} unchanged, nothing to commit", CONFIG_FILE);
    return Ok(false);
  }
  git.add(&[CONFIG_FILE])?;
  git.commit(&format!("{}: {}", CONFIG_FILE, message), false)?;
  info!("Committed {}", CONFIG_FILE);
  Ok(true)
}

/// Honor `--commit-changes` and `--push-changes` after an edit
pub fn finish_config_change(ctx: &PluginContext, message: &str) -> ProjectorResult<()> {
  if ctx.arguments.flag("--commit-changes") {
    commit_config_changes(&ctx.project, message)?;
  }
  if ctx.arguments.flag("--push-changes") {
    ctx.project.git()?.push_current()?;
  }
  Ok(())
}
