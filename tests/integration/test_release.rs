//! Tests for `projector version release`

use crate::helpers::*;
use anyhow::Result;

const OFFLINE: &[&str] = &["--no-fetch", "--no-upload", "--no-push-changes"];

/// An initialized project with a generated `setup.py`
fn releasable() -> Result<TestProject> {
  let project = TestProject::init("infi.hello")?;
  // setup.py is ignored, so the tree stays clean
  project.write_file("setup.py", "")?;
  Ok(project)
}

fn release(project: &TestProject, version: &str) -> Result<std::process::Output> {
  let mut args = vec!["version", "release", version];
  args.extend_from_slice(OFFLINE);
  project.run_raw(&args)
}

#[test]
fn test_release_trivial_then_minor() -> Result<()> {
  let project = releasable()?;

  let output = release(&project, "trivial")?;
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  assert!(project.tags()?.contains(&"v0.0.1".to_string()));
  assert_eq!(project.current_branch()?, "develop");
  assert_eq!(project.git(&["rev-parse", "master"])?, project.git(&["rev-parse", "v0.0.1^{commit}"])?);
  assert_eq!(
    project.git(&["log", "-1", "--format=%s", "master"])?,
    "Finished release v0.0.1"
  );

  project.commit_file("feature.txt", "feature")?;
  let output = release(&project, "minor")?;
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  assert!(project.tags()?.contains(&"v0.1".to_string()));
  Ok(())
}

#[test]
fn test_release_literal_version() -> Result<()> {
  let project = releasable()?;
  let output = release(&project, "1.2.3")?;
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  assert!(project.tags()?.contains(&"v1.2.3".to_string()));

  let output = release(&project, "1.2.3")?;
  assert_eq!(exit_code(&output), Some(1));
  Ok(())
}

#[test]
fn test_release_off_develop_is_rejected() -> Result<()> {
  let project = releasable()?;
  project.git(&["checkout", "master"])?;

  let output = release(&project, "trivial")?;

  assert_eq!(exit_code(&output), Some(1));
  assert_eq!(project.tags()?, vec!["v0"]);
  Ok(())
}

#[test]
fn test_release_with_unmerged_master_is_rejected() -> Result<()> {
  let project = releasable()?;
  project.git(&["checkout", "master"])?;
  project.commit_file("hotfix.txt", "hotfix")?;
  project.git(&["checkout", "develop"])?;
  let master = project.git(&["rev-parse", "master"])?;

  let output = release(&project, "trivial")?;

  assert_eq!(exit_code(&output), Some(1));
  assert_eq!(project.tags()?, vec!["v0"]);
  assert_eq!(project.git(&["rev-parse", "master"])?, master);
  Ok(())
}

#[test]
fn test_release_current_is_disallowed() -> Result<()> {
  let project = releasable()?;
  let output = release(&project, "current")?;
  assert_eq!(exit_code(&output), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("version upload"));
  Ok(())
}
