//! External process execution
//!
//! Every tool other than git (the build tool, the isolated interpreter) runs
//! through a [`CommandRunner`]. Callers receive a typed [`ProcessOutput`]
//! rather than raw `std::process::Output`, and tests substitute a recording
//! runner.

use crate::core::error::{ProcessError, ProjectorResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A command line to execute in a given directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub cwd: PathBuf,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.to_path_buf(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Human-readable command line
  pub fn display(&self) -> String {
    let mut parts = vec![self.program.display().to_string()];
    parts.extend(self.args.iter().cloned());
    parts.join(" ")
  }
}

/// What a finished process reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
  /// `None` when the process was killed by a signal
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ProcessOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs external tools
pub trait CommandRunner: Send + Sync {
  fn run(&self, invocation: &Invocation) -> ProjectorResult<ProcessOutput>;

  /// Run and turn a non-zero exit into a [`ProcessError`]
  fn run_checked(&self, invocation: &Invocation) -> ProjectorResult<ProcessOutput> {
    let output = self.run(invocation)?;
    if output.success() {
      return Ok(output);
    }
    Err(
      ProcessError {
        command: invocation.display(),
        code: output.code,
        stdout: output.stdout,
        stderr: output.stderr,
      }
      .into(),
    )
  }
}

/// Runs commands with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation) -> ProjectorResult<ProcessOutput> {
    info!("Executing {}", invocation.display());
    let output = Command::new(&invocation.program)
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .output()
      .with_context(|| format!("Failed to execute {}", invocation.program.display()))?;

    let result = ProcessOutput {
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    debug!(code = ?result.code, "{} finished", invocation.display());
    Ok(result)
  }
}
