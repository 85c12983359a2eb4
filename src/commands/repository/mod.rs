//! `projector repository`
//!
//! Creates and clones projects laid out the way the other commands expect:
//! a stable and an integration branch, a `v0` release tag on the stable
//! branch, and the skeleton files.

pub mod skeleton;

use super::{commit_changes, flag, positional};
use crate::core::config::{edit_config, keys, read_config};
use crate::core::context::ProjectContext;
use crate::core::error::{DispatchError, PreconditionError, ProjectorResult, ResultExt};
use crate::core::vcs::{BranchLayout, SystemGit, Vcs};
use crate::plugin::{CommandPlugin, Handler, PluginContext};
use crate::utils::{self, ScopedDirectory};
use clap::{Arg, Command};
use skeleton::{DEPRECATED_FILES, GITIGNORE, IGNORED_DOWNLOADS, INITIAL_FILES, ProjectBackup, UPDATED_FILES};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

const NAMESPACE_INIT: &str = "__import__(\"pkg_resources\").declare_namespace(__name__)\n";

pub struct RepositoryPlugin;

impl CommandPlugin for RepositoryPlugin {
  fn command_name(&self) -> &str {
    "repository"
  }

  fn grammar(&self) -> Command {
    Command::new("repository")
      .about("Create, clone and update project repositories")
      .subcommand(
        Command::new("init")
          .arg(flag(
            "mkdir",
            "Init the repository in a new directory instead of the current directory",
          ))
          .arg(positional(
            "project_name",
            "The name of the project in python-module-style (object)",
          ))
          .arg(positional("origin", "Remote repository url"))
          .arg(positional("short_description", "A one-line description"))
          .arg(positional("long_description", "A multi-line description")),
      )
      .subcommand(
        Command::new("clone")
          .arg(positional("origin", "Remote repository url"))
          .arg(Arg::new("local-path").help("If missing, the local path will be the project name")),
      )
      .subcommand(
        Command::new("skeleton").subcommand_required(true).subcommand(
          Command::new("update")
            .arg(flag(
              "remove-deprecated-files",
              "Remove files that were in use in previous versions of projector but are no longer necessary",
            ))
            .arg(commit_changes()),
        ),
      )
  }

  fn handlers(&self) -> Vec<Handler> {
    vec![
      Handler::new("init", init),
      Handler::new("clone", clone),
      Handler::new("skeleton", skeleton_update),
    ]
  }
}

/// What `repository init` needs to know about the new project
#[derive(Debug, Clone)]
pub struct NewProject {
  pub name: String,
  pub origin: String,
  pub short_description: String,
  pub long_description: String,
}

impl NewProject {
  fn from_arguments(ctx: &PluginContext) -> ProjectorResult<Self> {
    let text = |key: &str| ctx.arguments.require_text(key).map(str::to_string);
    Ok(Self {
      name: text("<project_name>")?,
      origin: text("<origin>")?,
      short_description: text("<short_description>")?,
      long_description: text("<long_description>")?,
    })
  }

  /// `src/infi/hello/__version__.py` for `infi.hello`
  pub fn version_file(&self) -> String {
    let mut parts = vec!["src"];
    parts.extend(self.name.split('.'));
    parts.push("__version__.py");
    parts.join("/")
  }

  /// Package directories under `src`, outermost namespace first
  pub fn package_directories(&self) -> Vec<PathBuf> {
    let mut packages = utils::namespace_packages(&self.name);
    packages.push(self.name.clone());
    packages.iter().map(|package| package.split('.').collect::<PathBuf>()).collect()
  }
}

/// Every line indented by a tab, without surrounding whitespace
pub fn indent(text: &str) -> String {
  text
    .lines()
    .map(|line| format!("\t{}", line))
    .collect::<Vec<_>>()
    .join("\n")
    .trim()
    .to_string()
}

fn upgrade_code() -> String {
  format!("{{{}}}", Uuid::new_v4())
}

/// Make sure the stable and integration branches exist locally
///
/// Branches the remote already has are tracked. Otherwise the stable branch
/// starts with an empty commit and the integration branch forks from it.
fn init_branches(git: &SystemGit, layout: &BranchLayout) -> ProjectorResult<()> {
  let local = git.branches()?;
  let remote = git.remote_branches(&layout.remote)?;

  if !local.contains(&layout.stable) {
    if remote.contains(&layout.stable) {
      git.create_branch(&layout.stable, &format!("{}/{}", layout.remote, layout.stable), true)?;
    } else {
      git.set_head_branch(&layout.stable)?;
      git.commit("Initial commit", true)?;
    }
  }
  if !local.contains(&layout.integration) {
    if remote.contains(&layout.integration) {
      git.create_branch(
        &layout.integration,
        &format!("{}/{}", layout.remote, layout.integration),
        true,
      )?;
    } else {
      git.create_branch(&layout.integration, &layout.stable, false)?;
    }
  }
  Ok(())
}

/// Tag the stable branch `v0`
fn release_initial_version(git: &SystemGit, layout: &BranchLayout) -> ProjectorResult<()> {
  git.checkout(&layout.stable)?;
  git.create_tag("v0", "v0")?;
  Ok(())
}

fn generate_sources(project: &ProjectContext, new: &NewProject) -> ProjectorResult<()> {
  for directory in new.package_directories() {
    let path = project.path("src").join(directory);
    fs::create_dir_all(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let init = path.join("__init__.py");
    fs::write(&init, NAMESPACE_INIT).with_context(|| format!("Failed to write {}", init.display()))?;
  }
  Ok(())
}

/// Create a project repository at `project.root`
pub fn init_repository(project: &ProjectContext, new: &NewProject) -> ProjectorResult<()> {
  if project.path(".git").exists() {
    return Err(
      PreconditionError {
        check: "repository".to_string(),
        message: "This directory is already a git repository".to_string(),
        help: None,
      }
      .into(),
    );
  }

  let layout = &project.layout;
  info!("Creating {} at {}", new.name, project.root.display());
  let git = SystemGit::init(&project.root)?;
  git.add_remote(&layout.remote, &new.origin)?;
  init_branches(&git, layout)?;
  release_initial_version(&git, layout)?;
  git.checkout(&layout.integration)?;

  skeleton::write_files(&project.root, INITIAL_FILES)?;
  let version_file = new.version_file();
  edit_config(&project.config_path(), |doc| {
    doc.set(&keys::NAME, &new.name);
    doc.set(&keys::NAMESPACE_PACKAGES, &utils::namespace_packages(&new.name));
    doc.set(&keys::VERSION_FILE, &version_file);
    doc.set(&keys::DESCRIPTION, &new.short_description);
    doc.set(&keys::LONG_DESCRIPTION, &indent(&new.long_description));
    doc.set(&keys::UPGRADE_CODE, &upgrade_code());
    doc.set(&keys::PRODUCT_NAME, &new.name);
    Ok(())
  })?;
  generate_sources(project, new)?;
  utils::append_missing_lines(&project.path(GITIGNORE.name), &[version_file.as_str(), IGNORED_DOWNLOADS])?;

  git.add_all()?;
  git.commit("added all project files", false)?;
  Ok(())
}

fn init(ctx: &PluginContext) -> ProjectorResult<()> {
  let new = NewProject::from_arguments(ctx)?;
  if !ctx.arguments.flag("--mkdir") {
    return init_repository(&ctx.project, &new);
  }
  let directory = ScopedDirectory::create(&ctx.project.path(utils::repository_dir_name(&new.name)))?;
  init_repository(&ctx.project.with_root(directory.path()), &new)
}

/// Clone `origin` into `destination`, which must not exist yet
pub fn clone_repository(project: &ProjectContext, origin: &str, destination: &str) -> ProjectorResult<()> {
  let directory = ScopedDirectory::create(&project.path(destination))?;
  debug!("Cloning {}", origin);
  let git = SystemGit::clone_from(origin, directory.path())?;
  let layout = &project.layout;
  if git.remote_branches(&layout.remote)?.contains(&layout.integration) {
    git.checkout(&layout.integration)?;
    init_branches(&git, layout)?;
  }
  Ok(())
}

fn clone(ctx: &PluginContext) -> ProjectorResult<()> {
  let origin = ctx.arguments.require_text("<origin>")?;
  let destination = ctx
    .arguments
    .text("<local-path>")
    .map(str::to_string)
    .unwrap_or_else(|| utils::repository_dir_name(origin));
  clone_repository(&ctx.project, origin, &destination)
}

/// Overwrite the skeleton files, keeping the project's own `[project]` keys
pub fn update_skeleton(project: &ProjectContext, remove_deprecated: bool, commit: bool) -> ProjectorResult<()> {
  info!("Starting skeleton update");
  let config = project.config_path();
  let backup = read_config(&config, ProjectBackup::capture)?;

  skeleton::write_files(&project.root, UPDATED_FILES)?;
  utils::append_missing_lines(&project.path(GITIGNORE.name), &[IGNORED_DOWNLOADS])?;
  if remove_deprecated {
    for name in DEPRECATED_FILES.iter().filter(|name| project.path(name).exists()) {
      info!("Removing {}", name);
      utils::remove_path(&project.path(name))?;
    }
  }
  edit_config(&config, |doc| {
    backup.restore(doc);
    Ok(())
  })?;

  if commit {
    info!("Committing changes");
    let git = project.git()?;
    let mut staged: Vec<&str> = UPDATED_FILES.iter().map(|file| file.name).collect();
    staged.push(GITIGNORE.name);
    git.add(&staged)?;
    git.commit_all("updated project files from skeleton")?;
  }
  Ok(())
}

fn skeleton_update(ctx: &PluginContext) -> ProjectorResult<()> {
  if !ctx.arguments.flag("update") {
    return Err(DispatchError::Usage("repository skeleton requires a sub-command".to_string()).into());
  }
  update_skeleton(
    &ctx.project,
    ctx.arguments.flag("--remove-deprecated-files"),
    ctx.arguments.flag("--commit-changes"),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::{CONFIG_FILE, ConfigDocument};
  use crate::core::process::SystemRunner;
  use std::path::Path;
  use std::sync::Arc;
  use tempfile::TempDir;

  fn hello() -> NewProject {
    NewProject {
      name: "infi.hello".to_string(),
      origin: "git@example.com:infi.hello.git".to_string(),
      short_description: "says hello".to_string(),
      long_description: "first line\nsecond line".to_string(),
    }
  }

  #[test]
  fn test_project_paths() {
    let new = hello();
    assert_eq!(new.version_file(), "src/infi/hello/__version__.py");
    assert_eq!(
      new.package_directories(),
      vec![PathBuf::from("infi"), Path::new("infi").join("hello")]
    );
  }

  #[test]
  fn test_indent() {
    assert_eq!(indent("first line\nsecond line\n"), "first line\n\tsecond line");
  }

  #[test]
  fn test_upgrade_code_is_braced() {
    let code = upgrade_code();
    assert!(code.starts_with('{') && code.ends_with('}'));
    assert_eq!(code.len(), 38);
  }

  #[test]
  fn test_init_refuses_existing_repository() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    let project = ProjectContext::new(dir.path(), Arc::new(SystemRunner));

    let err = init_repository(&project, &hello()).unwrap_err();
    assert!(err.to_string().contains("already a git repository"));
  }

  #[test]
  fn test_skeleton_update_keeps_project_keys() {
    let dir = TempDir::new().unwrap();
    fs::write(
      dir.path().join(CONFIG_FILE),
      "[project]\nname = \"infi.hello\"\ninstall_requires = [\"six\"]\n\n[old-section]\nkey = \"value\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("bootstrap.py"), "").unwrap();
    fs::write(dir.path().join(".gitignore"), "/bin/\n").unwrap();
    let project = ProjectContext::new(dir.path(), Arc::new(SystemRunner));

    update_skeleton(&project, true, false).unwrap();

    let doc = ConfigDocument::load(&dir.path().join(CONFIG_FILE)).unwrap();
    assert_eq!(doc.get(&keys::NAME).unwrap().as_deref(), Some("infi.hello"));
    assert_eq!(doc.get_or_default(&keys::INSTALL_REQUIRES).unwrap(), vec!["six"]);
    assert!(!doc.has_section("old-section"));
    assert!(doc.has_section("setup.py"));
    assert!(!dir.path().join("bootstrap.py").exists());
    assert!(dir.path().join("setup.in").exists());
    assert_eq!(fs::read_to_string(dir.path().join(".gitignore")).unwrap(), "/bin/\nget-pip.py\n");
  }
}
