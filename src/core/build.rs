//! Build tool (`bin/buildout`) invocation
//!
//! Parameters are immutable values: a call site that needs extra options
//! derives a new [`BuildParameters`] with [`BuildParameters::with`] and passes
//! it down. Nothing is accumulated in shared state.
//!
//! [`build_environment`] is the development-environment build step. It is a
//! plain function so `devenv build`, `requirements freeze` and the upload path
//! all run the same sequence.

use crate::core::config::{CONFIG_FILE, ConfigDocument, keys};
use crate::core::context::ProjectContext;
use crate::core::error::{ProjectorResult, ResultExt};
use crate::core::process::{CommandRunner, Invocation, ProcessOutput};
use crate::utils;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const GIT_RECIPES: &[&str] = &["zerokspot.recipe.git", "gitrecipe", "git-recipe"];
pub const SETUP_PY_RECIPE: &str = "infi.recipe.template.version";
pub const CONSOLE_SCRIPTS_RECIPE: &str = "infi.recipe.console_scripts";
pub const JS_REQUIREMENTS_RECIPE: &str = "infi.recipe.js_requirements";
pub const PYTHON_RECIPE: &str = "infi.recipe.python";
pub const APPLICATION_PACKAGER_RECIPE: &str = "infi.recipe.application_packager";

/// Default download cache, relative to the project root
pub const DEFAULT_DOWNLOAD_CACHE: &str = ".cache";

/// Directories and files `devenv build --clean` removes
pub const GENERATED_PATHS: &[&str] = &["bin", "eggs", "develop-eggs", "parts", ".cache", "setup.py"];

pub fn is_git_recipe(recipe: &str) -> bool {
  GIT_RECIPES.contains(&recipe)
}

/// Command-line parameters passed to every build tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameters {
  args: Vec<String>,
}

impl Default for BuildParameters {
  fn default() -> Self {
    Self {
      args: vec!["-s".to_string(), "-c".to_string(), CONFIG_FILE.to_string()],
    }
  }
}

impl BuildParameters {
  /// A copy with `extra` appended
  pub fn with<I, S>(&self, extra: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut args = self.args.clone();
    args.extend(extra.into_iter().map(Into::into));
    Self { args }
  }

  pub fn args(&self) -> &[String] {
    &self.args
  }
}

/// The project's build tool
pub struct BuildTool<'a> {
  root: &'a Path,
  runner: &'a dyn CommandRunner,
}

impl<'a> BuildTool<'a> {
  pub fn new(root: &'a Path, runner: &'a dyn CommandRunner) -> Self {
    Self { root, runner }
  }

  pub fn executable(&self) -> PathBuf {
    utils::executable_path(&self.root.join("bin"), "buildout")
  }

  pub fn is_bootstrapped(&self) -> bool {
    self.executable().exists()
  }

  /// Run the build tool with `params` followed by `command`
  pub fn run(&self, params: &BuildParameters, command: &[&str]) -> ProjectorResult<ProcessOutput> {
    self.run_with(&self.executable(), params, command)
  }

  fn run_with(&self, program: &Path, params: &BuildParameters, command: &[&str]) -> ProjectorResult<ProcessOutput> {
    let invocation = Invocation::new(program, self.root)
      .args(params.args().iter().cloned())
      .args(command.iter().copied());
    self.runner.run_checked(&invocation)
  }

  /// Create `bin/buildout` using `launcher`, a build tool outside the project
  pub fn bootstrap(&self, params: &BuildParameters, launcher: &Path) -> ProjectorResult<()> {
    info!("Bootstrapping the build tool");
    self.run_with(launcher, params, &["bootstrap"]).map(|_| ())
  }

  pub fn install(&self, params: &BuildParameters, sections: &[String]) -> ProjectorResult<()> {
    if sections.is_empty() {
      return Ok(());
    }
    info!("Installing {}", sections.join(", "));
    let mut command = vec!["install"];
    command.extend(sections.iter().map(String::as_str));
    self.run(params, &command).map(|_| ())
  }

  /// Install every section whose recipe satisfies `matches`
  pub fn install_by_recipe(
    &self,
    params: &BuildParameters,
    doc: &ConfigDocument,
    matches: impl Fn(&str) -> bool,
  ) -> ProjectorResult<Vec<String>> {
    let sections = doc.sections_with_recipe(matches);
    if sections.is_empty() {
      debug!("No sections to install");
    }
    self.install(params, &sections)?;
    Ok(sections)
  }

  /// Regenerate `setup.py` from `setup.in`
  pub fn create_setup_py(&self, params: &BuildParameters) -> ProjectorResult<()> {
    let doc = ConfigDocument::load(&self.root.join(CONFIG_FILE))?;
    self
      .install_by_recipe(&params.with(["buildout:develop="]), &doc, |r| r == SETUP_PY_RECIPE)
      .map(|_| ())
  }
}

/// Isolated interpreter installed by the `infi.recipe.python` section
pub fn isolated_python(root: &Path) -> PathBuf {
  utils::executable_path(&root.join("parts").join("python").join("bin"), "python")
}

/// Build tool shipped with the isolated interpreter
pub fn isolated_buildout(root: &Path) -> PathBuf {
  utils::executable_path(&root.join("parts").join("python").join("bin"), "buildout")
}

/// How the build tool resolves dependency versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionMode {
  #[default]
  Default,
  Newest,
  Offline,
  PreferFinal,
}

impl ResolutionMode {
  fn parameters(self) -> &'static [&'static str] {
    match self {
      ResolutionMode::Default => &[],
      ResolutionMode::Newest => &["-n"],
      ResolutionMode::Offline => &["-o"],
      ResolutionMode::PreferFinal => &["buildout:prefer-final=true"],
    }
  }
}

/// Steps of the development-environment build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub clean: bool,
  pub force_bootstrap: bool,
  pub no_submodules: bool,
  pub no_setup_py: bool,
  pub no_scripts: bool,
  pub no_js_requirements: bool,
  pub use_isolated_python: bool,
  pub mode: ResolutionMode,
  /// Appended to every build tool run
  pub extra_parameters: Vec<String>,
}

/// Remove everything the build tool generated
pub fn clean_environment(root: &Path) -> ProjectorResult<()> {
  for name in GENERATED_PATHS {
    utils::remove_path(&root.join(name))?;
  }
  utils::remove_files_with_extension(root, "pyc")
}

/// Bootstrap the build tool when needed and install the development sections
pub fn build_environment(ctx: &ProjectContext, options: &BuildOptions) -> ProjectorResult<()> {
  let doc = ConfigDocument::load(&ctx.config_path())?;
  if options.clean {
    info!("Cleaning build artifacts");
    clean_environment(&ctx.root)?;
  }

  let cache = doc
    .get(&keys::DOWNLOAD_CACHE)?
    .unwrap_or_else(|| DEFAULT_DOWNLOAD_CACHE.to_string());
  let dist_cache = ctx.path(&cache).join("dist");
  fs::create_dir_all(&dist_cache).with_context(|| format!("Failed to create {}", dist_cache.display()))?;

  let params = BuildParameters::default()
    .with(options.mode.parameters().iter().copied())
    .with(options.extra_parameters.iter().cloned());
  let tool = ctx.build_tool();

  let mut launcher = PathBuf::from("buildout");
  let mut rebootstrap = options.force_bootstrap;
  if options.use_isolated_python {
    if !isolated_python(&ctx.root).exists() {
      if !tool.is_bootstrapped() {
        tool.bootstrap(&params, &launcher)?;
      }
      tool.install_by_recipe(&params.with(["buildout:develop="]), &doc, |r| r == PYTHON_RECIPE)?;
      rebootstrap = true;
    }
    launcher = isolated_buildout(&ctx.root);
  }

  if rebootstrap || !tool.is_bootstrapped() {
    tool.bootstrap(&params, &launcher)?;
  }

  if !options.no_submodules {
    tool.install_by_recipe(&params.with(["buildout:develop="]), &doc, is_git_recipe)?;
  }
  if !options.no_setup_py {
    tool.create_setup_py(&params)?;
  }
  if !options.no_scripts {
    tool.install_by_recipe(&params, &doc, |r| r == CONSOLE_SCRIPTS_RECIPE)?;
  }
  if !options.no_js_requirements {
    tool.install_by_recipe(&params, &doc, |r| r == JS_REQUIREMENTS_RECIPE)?;
  }
  Ok(())
}
