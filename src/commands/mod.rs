//! Built-in commands
//!
//! ## Repository
//! - **repository**: init, clone and skeleton update
//! - **version**: release and upload
//!
//! ## Package sets
//! - **requirements**: install and development requirements, freeze/unfreeze
//! - **console-scripts**, **gui-scripts**: entry points
//! - **package-data**: data files shipped with the package
//! - **package-scripts**: post-install and pre-uninstall executables
//! - **submodule**: git submodules installed by the build tool
//! - **js-requirements**: javascript packages, freeze/unfreeze
//!
//! ## Environment
//! - **devenv**: build, relocate and pack the development environment
//! - **isolated-python**: version of the isolated interpreter

pub mod devenv;
pub mod isolated_python;
pub mod js_requirements;
pub mod package_data;
pub mod package_scripts;
pub mod repository;
pub mod requirements;
pub mod scripts;
pub mod submodule;
pub mod version;

use crate::plugin::CommandPlugin;
use clap::{Arg, ArgAction};
use std::sync::Arc;

/// Every command shipped with projector
pub fn builtin_plugins() -> Vec<Arc<dyn CommandPlugin>> {
  vec![
    Arc::new(repository::RepositoryPlugin),
    Arc::new(requirements::RequirementsPlugin),
    Arc::new(scripts::ScriptsPlugin::console()),
    Arc::new(scripts::ScriptsPlugin::gui()),
    Arc::new(package_data::PackageDataPlugin),
    Arc::new(package_scripts::PackageScriptsPlugin),
    Arc::new(submodule::SubmodulePlugin),
    Arc::new(devenv::DevEnvPlugin),
    Arc::new(version::VersionPlugin),
    Arc::new(isolated_python::IsolatedPythonPlugin),
    Arc::new(js_requirements::JsRequirementsPlugin),
  ]
}

pub(crate) fn flag(name: &'static str, help: &'static str) -> Arg {
  Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

pub(crate) fn positional(name: &'static str, help: &'static str) -> Arg {
  Arg::new(name).required(true).help(help)
}

pub(crate) fn commit_changes() -> Arg {
  flag("commit-changes", "commit the changes to buildout.toml")
}

pub(crate) fn push_changes() -> Arg {
  flag("push-changes", "push the commit to the remote")
}

/// Print one item per line
pub(crate) fn print_items<I, S>(items: I)
where
  I: IntoIterator<Item = S>,
  S: std::fmt::Display,
{
  for item in items {
    println!("{}", item);
  }
}
