//! Tests for `projector repository`

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_git_flow_layout() -> Result<()> {
  let project = TestProject::init("infi.hello")?;

  let mut branches = project.branches()?;
  branches.sort();
  assert_eq!(branches, vec!["develop", "master"]);
  assert_eq!(project.tags()?, vec!["v0"]);
  assert_eq!(project.current_branch()?, "develop");
  assert!(project.is_clean()?);
  assert_eq!(project.last_commit_message()?, "added all project files");

  let config: toml_edit::DocumentMut = project.read_file("buildout.toml")?.parse()?;
  assert_eq!(config["project"]["name"].as_str(), Some("infi.hello"));
  assert_eq!(config["project"]["version_file"].as_str(), Some("src/infi/hello/__version__.py"));
  assert_eq!(config["project"]["long_description"].as_str(), Some("A project that\n\tsays hello"));
  assert_eq!(config["project"]["namespace_packages"].as_array().map(|a| a.len()), Some(1));
  assert!(project.file_exists("src/infi/__init__.py"));
  assert!(project.file_exists("src/infi/hello/__init__.py"));

  let gitignore = project.read_file(".gitignore")?;
  assert!(gitignore.contains("src/infi/hello/__version__.py"));
  assert!(gitignore.contains("get-pip.py"));
  Ok(())
}

#[test]
fn test_init_twice_fails() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  let output = project.run_raw(&["repository", "init", "infi.other", "origin", "short", "long"])?;
  assert_eq!(exit_code(&output), Some(1));
  assert_eq!(project.tags()?, vec!["v0"]);
  Ok(())
}

#[test]
fn test_init_mkdir() -> Result<()> {
  let project = TestProject::empty()?;
  project.run(&["repository", "init", "--mkdir", "infi.hello", "origin", "short", "long"])?;

  let created = project.at(&project.path.join("infi.hello"));
  assert_eq!(created.current_branch()?, "develop");
  assert!(created.file_exists("buildout.toml"));

  let output = project.run_raw(&["repository", "init", "--mkdir", "infi.hello", "origin", "short", "long"])?;
  assert_eq!(exit_code(&output), Some(1));
  Ok(())
}

#[test]
fn test_clone_tracks_both_branches() -> Result<()> {
  let origin = TestProject::init("infi.hello")?;
  let origin_url = origin.path.to_string_lossy().to_string();
  let workspace = origin.at(origin.path.parent().unwrap_or(&origin.path));

  workspace.run(&["repository", "clone", &origin_url, "copy"])?;

  let copy = origin.at(&workspace.path.join("copy"));
  assert_eq!(copy.current_branch()?, "develop");
  let mut branches = copy.branches()?;
  branches.sort();
  assert_eq!(branches, vec!["develop", "master"]);
  Ok(())
}

#[test]
fn test_skeleton_update_keeps_project_name() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.write_file("bootstrap.py", "")?;

  project.run(&["repository", "skeleton", "update", "--remove-deprecated-files", "--commit-changes"])?;

  assert!(!project.file_exists("bootstrap.py"));
  assert!(project.read_file("buildout.toml")?.contains("name = \"infi.hello\""));
  assert_eq!(project.last_commit_message()?, "updated project files from skeleton");
  Ok(())
}
