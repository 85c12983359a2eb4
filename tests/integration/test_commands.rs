//! Tests for the package-set editing commands

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_requirements_add_list_remove() -> Result<()> {
  let project = TestProject::init("infi.hello")?;

  project.run(&["requirements", "add", "six", "--commit-changes"])?;
  assert_eq!(project.last_commit_message()?, "buildout.toml: adding six to requirements");
  assert!(project.is_clean()?);
  assert!(project.stdout(&["requirements", "list"])?.lines().any(|l| l == "six"));

  project.run(&["requirements", "remove", "six"])?;
  assert!(!project.stdout(&["requirements", "list"])?.lines().any(|l| l == "six"));
  Ok(())
}

#[test]
fn test_development_requirements() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&["requirements", "add", "pytest", "--development"])?;
  let listed = project.stdout(&["requirements", "list", "--development"])?;
  assert!(listed.lines().any(|l| l == "pytest"));
  assert!(listed.lines().any(|l| l == "ipython"));
  Ok(())
}

#[test]
fn test_unchanged_config_is_not_committed() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&["requirements", "add", "setuptools", "--commit-changes"])?;
  assert_eq!(project.last_commit_message()?, "added all project files");
  Ok(())
}

#[test]
fn test_console_and_gui_scripts() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&["console-scripts", "add", "hello", "infi.hello:main"])?;
  project.run(&["gui-scripts", "add", "hello-gui", "infi.hello.gui:main"])?;

  assert_eq!(project.stdout(&["console-scripts", "list"])?.trim(), "hello = infi.hello:main");
  assert_eq!(project.stdout(&["gui-scripts", "list"])?.trim(), "hello-gui = infi.hello.gui:main");

  project.run(&["console-scripts", "remove", "hello"])?;
  assert_eq!(project.stdout(&["console-scripts", "list"])?.trim(), "");
  Ok(())
}

#[test]
fn test_package_data_rewrites_manifest() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&["package-data", "add", "*.json"])?;
  project.run(&["package-data", "add", "static/*"])?;

  assert_eq!(project.read_file("MANIFEST.in")?, "recursive-include src *.json static/*\n");

  project.run(&["package-data", "remove", "*.json"])?;
  assert_eq!(project.read_file("MANIFEST.in")?, "recursive-include src static/*\n");
  Ok(())
}

#[test]
fn test_package_scripts() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  assert_eq!(project.stdout(&["package-scripts", "show", "--post-install"])?.trim(), "None");

  project.run(&["package-scripts", "set", "hello", "--post-install", "--commit-changes"])?;

  assert_eq!(project.stdout(&["package-scripts", "show", "--post-install"])?.trim(), "hello");
  assert_eq!(project.stdout(&["package-scripts", "show", "--pre-uninstall"])?.trim(), "None");
  assert_eq!(
    project.last_commit_message()?,
    "buildout.toml: setting post_install_script_name to hello"
  );

  let output = project.run_raw(&["package-scripts", "show"])?;
  assert_eq!(exit_code(&output), Some(1));
  Ok(())
}

#[test]
fn test_submodules() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&[
    "submodule",
    "add",
    "infi.vendor",
    "git://example.com/vendor.git",
    "origin/master",
    "--use-setup-py",
  ])?;
  assert_eq!(project.stdout(&["submodule", "list"])?.trim(), "infi.vendor");

  let config: toml_edit::DocumentMut = project.read_file("buildout.toml")?.parse()?;
  assert_eq!(config["infi.vendor"]["recipe"].as_str(), Some("zerokspot.recipe.git"));
  let develop: Vec<&str> = config["buildout"]["develop"]
    .as_array()
    .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
    .unwrap_or_default();
  assert_eq!(develop, vec![".", "infi.vendor"]);

  project.run(&["submodule", "remove", "infi.vendor"])?;
  assert_eq!(project.stdout(&["submodule", "list"])?.trim(), "");
  Ok(())
}

#[test]
fn test_isolated_python_version() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&["isolated-python", "python-version", "set", "3.9.1"])?;
  assert_eq!(project.stdout(&["isolated-python", "python-version", "get"])?.trim(), "v3.9.1");
  Ok(())
}

#[test]
fn test_js_requirements() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  assert!(project.stdout(&["js-requirements", "list"])?.contains("Please initiate js-requirements"));
  assert!(project.stdout(&["js-requirements", "freeze"])?.contains("Missing js-requirements section"));

  project.run(&["js-requirements", "add", "zone.js"])?;
  project.run(&["js-requirements", "add", "Angular"])?;
  assert_eq!(project.stdout(&["js-requirements", "list"])?, "Angular\nzone.js\n");

  std::fs::create_dir_all(project.path.join("parts/js"))?;
  project.write_file("parts/js/.package-lock.json", r#"{"zone.js": "0.8.0", "Angular": "1.5.0"}"#)?;
  project.run(&["js-requirements", "freeze"])?;
  let config: toml_edit::DocumentMut = project.read_file("buildout.toml")?.parse()?;
  assert_eq!(config["js_versions"]["Angular"].as_str(), Some("1.5.0"));
  assert_eq!(config["buildout"]["js_versions"].as_bool(), Some(true));

  project.run(&["js-requirements", "unfreeze"])?;
  let config: toml_edit::DocumentMut = project.read_file("buildout.toml")?.parse()?;
  assert!(config.get("js_versions").is_none());
  Ok(())
}

#[test]
fn test_devenv_relocate() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.run(&["devenv", "relocate", "--absolute", "--commit-changes"])?;
  let config: toml_edit::DocumentMut = project.read_file("buildout.toml")?.parse()?;
  assert_eq!(config["buildout"]["relative-paths"].as_bool(), Some(false));
  assert_eq!(
    project.last_commit_message()?,
    "buildout.toml: Changing shebang to absolute paths"
  );
  Ok(())
}
