//! System git backend
//!
//! Every operation is a `git` subprocess run in an isolated environment:
//! only PATH, HOME and explicit identity variables are passed through, and
//! signing or interactive prompts are switched off.

use crate::core::error::{GitError, ProjectorError, ProjectorResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Environment variables forwarded to git besides PATH and HOME
const FORWARDED_ENV: &[&str] = &[
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "GIT_CONFIG_GLOBAL",
  "XDG_CONFIG_HOME",
];

/// Git backend using the system git binary
#[derive(Debug, Clone)]
pub struct SystemGit {
  /// Working tree root
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open the git repository containing `path`
  pub fn open(path: &Path) -> ProjectorResult<Self> {
    let output = base_command()
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      return Err(ProjectorError::Git(GitError::RepoNotFound {
        path: path.to_path_buf(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Self {
      repo_path: PathBuf::from(stdout.trim()),
    })
  }

  /// Create an empty repository at `path`
  pub fn init(path: &Path) -> ProjectorResult<Self> {
    let output = base_command()
      .arg("init")
      .arg(path)
      .output()
      .context("Failed to execute git init")?;
    check_output("git init", output)?;
    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Clone `origin` into `destination`
  pub fn clone_from(origin: &str, destination: &Path) -> ProjectorResult<Self> {
    let output = base_command()
      .arg("clone")
      .arg(origin)
      .arg(destination)
      .output()
      .context("Failed to execute git clone")?;
    check_output(&format!("git clone {}", origin), output)?;
    Ok(Self {
      repo_path: destination.to_path_buf(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.repo_path
  }

  /// Create a git command rooted at the repository
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = base_command();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }

  /// Run git and return trimmed stdout, failing on a non-zero exit
  pub(crate) fn run(&self, args: &[&str]) -> ProjectorResult<String> {
    debug!("git {}", args.join(" "));
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;
    let output = check_output(&format!("git {}", args.join(" ")), output)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run git and report whether it exited successfully
  pub(crate) fn succeeds(&self, args: &[&str]) -> ProjectorResult<bool> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;
    Ok(output.status.success())
  }
}

fn base_command() -> Command {
  let mut cmd = Command::new("git");

  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }
  for name in FORWARDED_ENV {
    if let Ok(value) = std::env::var(name) {
      cmd.env(name, value);
    }
  }
  cmd.env("GIT_TERMINAL_PROMPT", "0");

  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false");
  cmd.arg("-c").arg("commit.gpgSign=false");
  cmd.arg("-c").arg("tag.gpgSign=false");

  cmd
}

fn check_output(command: &str, output: Output) -> ProjectorResult<Output> {
  if output.status.success() {
    return Ok(output);
  }
  let stderr = String::from_utf8_lossy(&output.stderr);
  let stdout = String::from_utf8_lossy(&output.stdout);
  Err(ProjectorError::Git(GitError::CommandFailed {
    command: command.to_string(),
    stderr: if stderr.trim().is_empty() {
      stdout.trim().to_string()
    } else {
      stderr.trim().to_string()
    },
  }))
}
