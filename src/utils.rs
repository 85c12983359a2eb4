//! Filesystem and naming helpers

use crate::core::error::{ProjectorError, ProjectorResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of an executable named `name` inside `dir`
///
/// Adds `.exe` on Windows.
pub fn executable_path(dir: &Path, name: &str) -> PathBuf {
  if cfg!(windows) {
    dir.join(format!("{}.exe", name))
  } else {
    dir.join(name)
  }
}

/// Remove a file or a directory tree; missing paths are ignored
pub fn remove_path(path: &Path) -> ProjectorResult<()> {
  let Ok(metadata) = fs::symlink_metadata(path) else {
    return Ok(());
  };
  debug!("Removing {}", path.display());
  if metadata.is_dir() {
    fs::remove_dir_all(path).with_context(|| format!("Failed to remove {}", path.display()))
  } else {
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))
  }
}

/// Delete every file ending in `.{extension}` below `root`, skipping `.git`
pub fn remove_files_with_extension(root: &Path, extension: &str) -> ProjectorResult<()> {
  let entries = fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?;
  for entry in entries {
    let entry = entry?;
    let path = entry.path();
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
      if entry.file_name() != ".git" {
        remove_files_with_extension(&path, extension)?;
      }
    } else if path.extension().is_some_and(|ext| ext == extension) {
      fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
  }
  Ok(())
}

/// Directory name git would pick when cloning `origin`
///
/// `git@host:group/infi.hello.git` and `https://host/infi.hello` both give `infi.hello`.
pub fn repository_dir_name(origin: &str) -> String {
  let trimmed = origin.trim_end_matches(['/', '\\']);
  let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
  trimmed
    .rsplit(['/', '\\', ':'])
    .next()
    .unwrap_or(trimmed)
    .to_string()
}

/// Enclosing namespace packages of a dotted package name
///
/// `infi.recipe.python` has namespaces `infi` and `infi.recipe`.
pub fn namespace_packages(name: &str) -> Vec<String> {
  let parts: Vec<&str> = name.split('.').collect();
  (1..parts.len()).map(|n| parts[..n].join(".")).collect()
}

/// Append `lines` to the file at `path`, skipping lines already present
pub fn append_missing_lines(path: &Path, lines: &[&str]) -> ProjectorResult<()> {
  let existing = fs::read_to_string(path).unwrap_or_default();
  let present: Vec<&str> = existing.lines().map(str::trim).collect();
  let missing: Vec<&str> = lines.iter().copied().filter(|line| !present.contains(line)).collect();
  if missing.is_empty() {
    return Ok(());
  }
  let mut content = existing.clone();
  if !content.is_empty() && !content.ends_with('\n') {
    content.push('\n');
  }
  for line in missing {
    content.push_str(line);
    content.push('\n');
  }
  fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// A directory created for the duration of an operation
///
/// Dropping the guard removes the directory again if it is still empty, so a
/// failed `init --mkdir` or clone leaves nothing behind.
#[derive(Debug)]
pub struct ScopedDirectory {
  path: PathBuf,
}

impl ScopedDirectory {
  /// Create `path`; it must not exist yet
  pub fn create(path: &Path) -> ProjectorResult<Self> {
    if path.exists() {
      return Err(ProjectorError::with_help(
        format!("{} already exists", path.display()),
        "Choose another directory or remove the existing one.",
      ));
    }
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(Self {
      path: path.to_path_buf(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Drop for ScopedDirectory {
  fn drop(&mut self) {
    let empty = fs::read_dir(&self.path).map(|mut entries| entries.next().is_none());
    if matches!(empty, Ok(true)) {
      let _ = fs::remove_dir(&self.path);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_repository_dir_name() {
    assert_eq!(repository_dir_name("git@github.com:Infinidat/infi.hello.git"), "infi.hello");
    assert_eq!(repository_dir_name("https://github.com/Infinidat/infi.hello"), "infi.hello");
    assert_eq!(repository_dir_name("https://github.com/Infinidat/infi.hello/"), "infi.hello");
    assert_eq!(repository_dir_name("../mirror/infi.hello.git"), "infi.hello");
    assert_eq!(repository_dir_name("infi.hello"), "infi.hello");
  }

  #[test]
  fn test_namespace_packages() {
    assert_eq!(namespace_packages("infi.recipe.python"), vec!["infi", "infi.recipe"]);
    assert!(namespace_packages("hello").is_empty());
  }

  #[test]
  fn test_append_missing_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".gitignore");
    fs::write(&path, "bin\nparts").unwrap();

    append_missing_lines(&path, &["parts", "get-pip.py"]).unwrap();
    append_missing_lines(&path, &["get-pip.py"]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "bin\nparts\nget-pip.py\n");
  }

  #[test]
  fn test_scoped_directory_removed_when_empty() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty");
    let used = dir.path().join("used");

    drop(ScopedDirectory::create(&empty).unwrap());
    {
      let scoped = ScopedDirectory::create(&used).unwrap();
      fs::write(scoped.path().join("README.md"), "hello").unwrap();
    }

    assert!(!empty.exists());
    assert!(used.join("README.md").exists());
  }

  #[test]
  fn test_scoped_directory_refuses_existing() {
    let dir = TempDir::new().unwrap();
    assert!(ScopedDirectory::create(dir.path()).is_err());
  }
}
