//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::rc::Rc;
use tempfile::TempDir;

/// A scratch directory with its own HOME and git identity
pub struct TestProject {
  _root: Rc<TempDir>,
  home: PathBuf,
  pub path: PathBuf,
}

impl TestProject {
  /// Empty project directory, nothing initialized
  pub fn empty() -> Result<Self> {
    let root = TempDir::new()?;
    let home = root.path().join("home");
    let path = root.path().join("work");
    std::fs::create_dir_all(&home)?;
    std::fs::create_dir_all(&path)?;
    std::fs::write(
      home.join(".gitconfig"),
      "[user]\n\tname = Test User\n\temail = test@example.com\n[commit]\n\tgpgsign = false\n",
    )?;
    Ok(Self {
      _root: Rc::new(root),
      home,
      path,
    })
  }

  /// A project created by `repository init`
  pub fn init(name: &str) -> Result<Self> {
    let project = Self::empty()?;
    project.run(&[
      "repository",
      "init",
      name,
      "git@example.com:infi/hello.git",
      "says hello",
      "A project that\nsays hello",
    ])?;
    Ok(project)
  }

  /// Same HOME, different working directory
  pub fn at(&self, path: &Path) -> Self {
    Self {
      _root: Rc::clone(&self._root),
      home: self.home.clone(),
      path: path.to_path_buf(),
    }
  }

  fn command(&self, program: &str) -> Command {
    let mut command = Command::new(program);
    command
      .current_dir(&self.path)
      .env("HOME", &self.home)
      .env("GIT_CONFIG_GLOBAL", self.home.join(".gitconfig"))
      .env("XDG_CONFIG_HOME", self.home.join(".config"))
      .env("RUST_LOG", "warn");
    command
  }

  /// Run projector, failing on a non-zero exit
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    let output = self.run_raw(args)?;
    if !output.status.success() {
      anyhow::bail!(
        "projector command failed: projector {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
      );
    }
    Ok(output)
  }

  /// Run projector and return its output whatever the exit status
  pub fn run_raw(&self, args: &[&str]) -> Result<Output> {
    self
      .command(env!("CARGO_BIN_EXE_projector"))
      .args(args)
      .output()
      .context("Failed to run projector")
  }

  /// Run projector and return its stdout
  pub fn stdout(&self, args: &[&str]) -> Result<String> {
    let output = self.run(args)?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }

  /// Run git in the project, returning trimmed stdout
  pub fn git(&self, args: &[&str]) -> Result<String> {
    let output = self
      .command("git")
      .args(args)
      .output()
      .context("Failed to run git command")?;
    if !output.status.success() {
      anyhow::bail!(
        "Git command failed: git {}\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
      );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn tags(&self) -> Result<Vec<String>> {
    Ok(self.git(&["tag", "--list"])?.lines().map(String::from).collect())
  }

  pub fn branches(&self) -> Result<Vec<String>> {
    Ok(
      self
        .git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"])?
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  pub fn current_branch(&self) -> Result<String> {
    self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
  }

  pub fn last_commit_message(&self) -> Result<String> {
    self.git(&["log", "-1", "--format=%s"])
  }

  pub fn is_clean(&self) -> Result<bool> {
    Ok(self.git(&["status", "--porcelain"])?.is_empty())
  }

  /// Commit a new file on the current branch
  pub fn commit_file(&self, name: &str, content: &str) -> Result<()> {
    self.write_file(name, content)?;
    self.git(&["add", name])?;
    self.git(&["commit", "-m", &format!("add {}", name)])?;
    Ok(())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    Ok(std::fs::write(self.path.join(path), content)?)
  }
}

pub fn exit_code(output: &Output) -> Option<i32> {
  output.status.code()
}
