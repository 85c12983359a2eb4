//! Tests for command-line dispatch

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_version_flag() -> Result<()> {
  let project = TestProject::empty()?;
  assert_eq!(project.stdout(&["-v"])?.trim(), env!("CARGO_PKG_VERSION"));
  Ok(())
}

#[test]
fn test_help_lists_every_command() -> Result<()> {
  let project = TestProject::empty()?;
  let help = project.stdout(&["--help"])?;
  for line in [
    "projector repository init <project_name> <origin> <short_description> <long_description> [--mkdir]",
    "projector version release <version>",
    "projector requirements freeze [--newest] [--commit-changes] [--push-changes]",
    "projector isolated-python python-version set <version> [--commit-changes]",
  ] {
    assert!(help.contains(line), "missing {line:?} in\n{help}");
  }
  Ok(())
}

#[test]
fn test_no_command_exits_with_one() -> Result<()> {
  let project = TestProject::empty()?;
  assert_eq!(exit_code(&project.run_raw(&[])?), Some(1));
  assert_eq!(exit_code(&project.run_raw(&["frobnicate"])?), Some(1));
  Ok(())
}

#[test]
fn test_commands_outside_a_project_fail() -> Result<()> {
  let project = TestProject::empty()?;
  let output = project.run_raw(&["requirements", "list"])?;
  assert_eq!(exit_code(&output), Some(1));
  Ok(())
}

#[test]
fn test_defaults_file_supplies_missing_flags() -> Result<()> {
  let project = TestProject::init("infi.hello")?;
  project.write_file(".projector", "[commandline-arguments]\n\"--commit-changes\" = true\n")?;

  project.run(&["requirements", "add", "six"])?;

  assert_eq!(project.last_commit_message()?, "buildout.toml: adding six to requirements");
  Ok(())
}
