//! `projector version`

use super::{flag, positional};
use crate::checks::requires_release_ready;
use crate::core::error::ProjectorResult;
use crate::plugin::{Arguments, CommandPlugin, Handler, PluginContext};
use crate::release::{BuildoutDistributions, ReleaseOptions, ReleaseWorkflow, UploadOptions, VersionSelector};
use clap::{Arg, Command};
use tracing::info;

const VERSION_HELP: &str = "x.y.z, or the keywords 'trivial', 'minor', 'major', 'current', 'latest'";

pub struct VersionPlugin;

fn distributions() -> Arg {
  Arg::new("distributions")
    .long("distributions")
    .value_name("DISTRIBUTIONS")
    .help("distributions to build [default: sdist,bdist_egg]")
}

fn pypi_servers() -> Arg {
  Arg::new("pypi-servers")
    .long("pypi-servers")
    .value_name("PYPI_SERVERS")
    .help("index servers to upload to [default: pypi]")
}

impl CommandPlugin for VersionPlugin {
  fn command_name(&self) -> &str {
    "version"
  }

  fn grammar(&self) -> Command {
    Command::new("version")
      .about("Release and upload versions")
      .subcommand(
        Command::new("release")
          .arg(positional("version", VERSION_HELP))
          .arg(flag("no-fetch", "do not fetch origin before releasing"))
          .arg(
            flag("no-upload", "do not upload the release to the index servers")
              .conflicts_with_all(["distributions", "pypi-servers"]),
          )
          .arg(distributions())
          .arg(pypi_servers())
          .arg(flag("no-push-changes", "do not push the branches and tags to origin"))
          .arg(flag("keep-leftovers", "do not roll back the repository when the release fails")),
      )
      .subcommand(
        Command::new("upload")
          .arg(positional("version", VERSION_HELP))
          .arg(distributions())
          .arg(pypi_servers()),
      )
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![Handler::new("release", release), Handler::new("upload", upload)]
  }

  fn check_preconditions(&self, ctx: &PluginContext) -> ProjectorResult<()> {
    ctx.require(&requires_release_ready(&ctx.project.layout.integration))
  }
}

/// `--distributions` and `--pypi-servers`, falling back to the defaults
pub fn upload_options(arguments: &Arguments) -> UploadOptions {
  let defaults = UploadOptions::default();
  UploadOptions {
    distributions: arguments
      .comma_list("--distributions")
      .filter(|d| !d.is_empty())
      .unwrap_or(defaults.distributions),
    indexes: arguments
      .comma_list("--pypi-servers")
      .filter(|i| !i.is_empty())
      .unwrap_or(defaults.indexes),
  }
}

fn selector(ctx: &PluginContext) -> ProjectorResult<VersionSelector> {
  Ok(VersionSelector::parse(ctx.arguments.require_text("<version>")?))
}

fn release(ctx: &PluginContext) -> ProjectorResult<()> {
  let selector = selector(ctx)?;
  let options = ReleaseOptions {
    no_fetch: ctx.arguments.flag("--no-fetch"),
    no_upload: ctx.arguments.flag("--no-upload"),
    no_push_changes: ctx.arguments.flag("--no-push-changes"),
    keep_leftovers: ctx.arguments.flag("--keep-leftovers"),
    upload: upload_options(&ctx.arguments),
  };
  let git = ctx.project.git()?;
  let builder = BuildoutDistributions::new(ctx.project.build_tool());
  let tag = ReleaseWorkflow::new(&git, &ctx.project.layout, &builder).release(&selector, &options)?;
  info!("Released {}", tag);
  Ok(())
}

fn upload(ctx: &PluginContext) -> ProjectorResult<()> {
  let selector = selector(ctx)?;
  let git = ctx.project.git()?;
  let builder = BuildoutDistributions::new(ctx.project.build_tool());
  let tag = ReleaseWorkflow::new(&git, &ctx.project.layout, &builder).upload(&selector, &upload_options(&ctx.arguments))?;
  info!("Uploaded {}", tag);
  Ok(())
}
