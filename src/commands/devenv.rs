//! `projector devenv`

use super::{commit_changes, flag};
use crate::checks::{requires_isolated_python, requires_repository};
use crate::core::build::{APPLICATION_PACKAGER_RECIPE, BuildOptions, BuildParameters, ResolutionMode, build_environment};
use crate::core::config::{edit_config, keys, read_config};
use crate::core::error::ProjectorResult;
use crate::editors::finish_config_change;
use crate::plugin::{Arguments, CommandPlugin, Handler, PluginContext};
use clap::{ArgGroup, Command};
use tracing::{info, warn};

pub struct DevEnvPlugin;

impl CommandPlugin for DevEnvPlugin {
  fn command_name(&self) -> &str {
    "devenv"
  }

  fn grammar(&self) -> Command {
    Command::new("devenv")
      .about("Build and maintain the development environment")
      .subcommand(
        Command::new("build")
          .arg(flag("clean", "clean build-related files and directories before building"))
          .arg(flag("force-bootstrap", "run bootstrap even if the build tool is already installed"))
          .arg(flag("no-submodules", "do not clone git sub-modules defined in buildout.toml"))
          .arg(flag("no-setup-py", "do not generate setup.py"))
          .arg(flag("no-js-requirements", "do not install js requirements"))
          .arg(flag("no-scripts", "do not create console scripts"))
          .arg(flag("use-isolated-python", "use the isolated python to bootstrap the build tool"))
          .arg(flag("newest", "always check for new package versions"))
          .arg(flag("offline", "install packages only from the download cache"))
          .arg(flag("prefer-final", "prefer final versions over pre-releases"))
          .group(
            ArgGroup::new("resolution")
              .args(["newest", "offline", "prefer-final"])
              .multiple(false),
          ),
      )
      .subcommand(
        Command::new("relocate")
          .arg(flag("absolute", "change the shebang of all executables to absolute paths"))
          .arg(flag("relative", "change the shebang of all executables to relative paths"))
          .group(ArgGroup::new("paths").args(["absolute", "relative"]).required(true))
          .arg(commit_changes()),
      )
      .subcommand(Command::new("pack"))
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![
      Handler::new("build", build),
      Handler::new("relocate", relocate),
      Handler::new("pack", pack),
    ]
  }

  fn check_preconditions(&self, ctx: &PluginContext) -> ProjectorResult<()> {
    ctx.require(&requires_repository())
  }
}

/// Map `devenv build` flags onto build options
pub fn build_options(arguments: &Arguments) -> BuildOptions {
  let mode = if arguments.flag("--newest") {
    ResolutionMode::Newest
  } else if arguments.flag("--offline") {
    ResolutionMode::Offline
  } else if arguments.flag("--prefer-final") {
    ResolutionMode::PreferFinal
  } else {
    ResolutionMode::Default
  };
  BuildOptions {
    clean: arguments.flag("--clean"),
    force_bootstrap: arguments.flag("--force-bootstrap"),
    no_submodules: arguments.flag("--no-submodules"),
    no_setup_py: arguments.flag("--no-setup-py"),
    no_scripts: arguments.flag("--no-scripts"),
    no_js_requirements: arguments.flag("--no-js-requirements"),
    use_isolated_python: arguments.flag("--use-isolated-python"),
    mode,
    extra_parameters: Vec::new(),
  }
}

fn build(ctx: &PluginContext) -> ProjectorResult<()> {
  build_environment(&ctx.project, &build_options(&ctx.arguments))
}

fn relocate(ctx: &PluginContext) -> ProjectorResult<()> {
  let relative = ctx.arguments.flag("--relative");
  edit_config(&ctx.project.config_path(), |doc| {
    doc.set(&keys::RELATIVE_PATHS, &relative);
    Ok(())
  })?;
  let paths = if relative { "relative" } else { "absolute" };
  finish_config_change(ctx, &format!("Changing shebang to {} paths", paths))?;
  info!("Configuration changed. Run `projector devenv build [--use-isolated-python]`.");
  Ok(())
}

fn pack(ctx: &PluginContext) -> ProjectorResult<()> {
  ctx.require(&requires_isolated_python())?;
  let tool = ctx.project.build_tool();
  let sections = read_config(&ctx.project.config_path(), |doc| {
    tool.install_by_recipe(&BuildParameters::default(), doc, |r| r == APPLICATION_PACKAGER_RECIPE)
  })?;
  if sections.is_empty() {
    warn!("No section uses {}", APPLICATION_PACKAGER_RECIPE);
  }
  Ok(())
}
