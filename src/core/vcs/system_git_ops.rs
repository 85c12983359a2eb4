//! Branch, tag, merge and remote operations for SystemGit

use super::Vcs;
use super::system_git::SystemGit;
use crate::core::error::{GitError, ProjectorError, ProjectorResult, ResultExt};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

impl SystemGit {
  /// Add a remote repository
  pub fn add_remote(&self, name: &str, url: &str) -> ProjectorResult<()> {
    self.run(&["remote", "add", name, url]).map(|_| ())
  }

  /// Point HEAD at a branch that may not exist yet
  pub fn set_head_branch(&self, branch: &str) -> ProjectorResult<()> {
    let target = format!("refs/heads/{}", branch);
    self.run(&["symbolic-ref", "HEAD", &target]).map(|_| ())
  }

  /// Create `branch` at `start`
  ///
  /// With `track`, the new branch follows `start` as its upstream.
  pub fn create_branch(&self, branch: &str, start: &str, track: bool) -> ProjectorResult<()> {
    let mode = if track { "--track" } else { "--no-track" };
    self.run(&["branch", mode, branch, start]).map(|_| ())
  }

  /// Branches of `remote` known locally, without the remote prefix
  pub fn remote_branches(&self, remote: &str) -> ProjectorResult<BTreeSet<String>> {
    let prefix = format!("refs/remotes/{}", remote);
    let listing = self.run(&["for-each-ref", "--format=%(refname:short)", &prefix])?;
    let strip = format!("{}/", remote);
    Ok(
      listing
        .lines()
        .filter_map(|line| line.trim().strip_prefix(&strip))
        .filter(|name| *name != "HEAD")
        .map(str::to_string)
        .collect(),
    )
  }

  /// Stage `paths` (relative to the repository root)
  pub fn add(&self, paths: &[&str]) -> ProjectorResult<()> {
    let mut args = vec!["add", "--"];
    args.extend_from_slice(paths);
    self.run(&args).map(|_| ())
  }

  /// Stage every change, including removals
  pub fn add_all(&self) -> ProjectorResult<()> {
    self.run(&["add", "--all"]).map(|_| ())
  }

  /// Remove `paths` from the index and the working tree
  pub fn remove(&self, paths: &[&str]) -> ProjectorResult<()> {
    let mut args = vec!["rm", "-f", "--"];
    args.extend_from_slice(paths);
    self.run(&args).map(|_| ())
  }

  /// Push the current branch to its upstream
  pub fn push_current(&self) -> ProjectorResult<()> {
    info!("Pushing changes");
    self.run(&["push"]).map(|_| ())
  }

  pub fn commit(&self, message: &str, allow_empty: bool) -> ProjectorResult<()> {
    let mut args = vec!["commit", "-m", message];
    if allow_empty {
      args.push("--allow-empty");
    }
    self.run(&args).map(|_| ())
  }

  /// Commit every change to tracked files, including removals
  pub fn commit_all(&self, message: &str) -> ProjectorResult<()> {
    self.run(&["commit", "-a", "-m", message]).map(|_| ())
  }

  fn list_refs(&self, prefix: &str) -> ProjectorResult<BTreeSet<String>> {
    let listing = self.run(&["for-each-ref", "--format=%(refname:short)", prefix])?;
    Ok(listing.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
  }
}

impl Vcs for SystemGit {
  fn current_branch(&self) -> ProjectorResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["symbolic-ref", "--quiet", "--short", "HEAD"])
      .output()
      .context("Failed to get current branch")?;
    if !output.status.success() {
      return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
  }

  fn branches(&self) -> ProjectorResult<BTreeSet<String>> {
    self.list_refs("refs/heads")
  }

  fn tags(&self) -> ProjectorResult<BTreeSet<String>> {
    self.list_refs("refs/tags")
  }

  fn branch_head(&self, branch: &str) -> ProjectorResult<Option<String>> {
    let refname = format!("refs/heads/{}", branch);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &refname])
      .output()
      .context("Failed to resolve branch")?;
    if !output.status.success() {
      return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
  }

  fn checkout(&self, rev: &str) -> ProjectorResult<()> {
    info!("Checking out {}", rev);
    self.run(&["checkout", rev]).map(|_| ())
  }

  fn force_checkout(&self, branch: &str) -> ProjectorResult<()> {
    info!("Discarding local changes and checking out {}", branch);
    self.run(&["reset", "--hard", "--quiet"])?;
    self.run(&["checkout", "-f", branch]).map(|_| ())
  }

  fn merge(&self, branch: &str, no_ff: bool, message: Option<&str>) -> ProjectorResult<()> {
    let mut args = vec!["merge", "--no-edit"];
    if no_ff {
      args.push("--no-ff");
    }
    if let Some(message) = message {
      args.extend(["-m", message]);
    }
    args.push(branch);
    info!("Merging {}", branch);
    self.run(&args).map(|_| ())
  }

  fn create_tag(&self, name: &str, message: &str) -> ProjectorResult<()> {
    info!("Tagging {}", name);
    self.run(&["tag", "-a", name, "-m", message]).map(|_| ())
  }

  fn delete_tag(&self, name: &str) -> ProjectorResult<()> {
    self.run(&["tag", "-d", name]).map(|_| ())
  }

  fn delete_branch(&self, name: &str) -> ProjectorResult<()> {
    self.run(&["branch", "-D", name]).map(|_| ())
  }

  fn reset_branch(&self, branch: &str, commit: &str) -> ProjectorResult<()> {
    self.run(&["checkout", "-f", branch])?;
    self.run(&["reset", "--hard", commit]).map(|_| ())
  }

  fn fetch(&self, remote: &str) -> ProjectorResult<()> {
    info!("Fetching from {}", remote);
    self.run(&["fetch", remote]).map(|_| ())
  }

  fn push_branches(&self, remote: &str) -> ProjectorResult<()> {
    info!("Pushing branches to {}", remote);
    self.run(&["push", remote, "--all"]).map(|_| ())
  }

  fn push_tags(&self, remote: &str) -> ProjectorResult<()> {
    info!("Pushing tags to {}", remote);
    self.run(&["push", remote, "--tags"]).map(|_| ())
  }

  fn is_ancestor(&self, ancestor: &str, descendant: &str) -> ProjectorResult<bool> {
    let output = self
      .git_cmd()
      .args(["merge-base", "--is-ancestor", ancestor, descendant])
      .output()
      .context("Failed to execute git merge-base")?;
    match output.status.code() {
      Some(0) => Ok(true),
      Some(1) => Ok(false),
      _ => Err(ProjectorError::Git(GitError::CommandFailed {
        command: format!("git merge-base --is-ancestor {} {}", ancestor, descendant),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      })),
    }
  }

  fn upstream(&self, branch: &str) -> ProjectorResult<Option<String>> {
    let refname = format!("{}@{{upstream}}", branch);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "--symbolic-full-name", &refname])
      .output()
      .context("Failed to resolve upstream")?;
    if !output.status.success() {
      return Ok(None);
    }
    let upstream = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!upstream.is_empty()).then_some(upstream))
  }

  fn describe(&self) -> ProjectorResult<String> {
    self.run(&["describe", "--tags"])
  }

  fn has_uncommitted_changes(&self) -> ProjectorResult<bool> {
    Ok(!self.run(&["status", "--porcelain", "--untracked-files=no"])?.is_empty())
  }

  fn is_modified(&self, path: &Path) -> ProjectorResult<bool> {
    let path = path.to_string_lossy();
    Ok(!self.run(&["status", "--porcelain", "--", &path])?.is_empty())
  }
}
