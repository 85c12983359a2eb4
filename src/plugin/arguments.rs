//! Parsed invocation: docopt-style argument names mapped to values
//!
//! Sub-command names map to flags (`release`), positional arguments are
//! wrapped in angle brackets (`<version>`) and options keep their dashes
//! (`--no-fetch`).

use crate::core::config::ConfigDocument;
use crate::core::error::{DispatchError, ProjectorResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use toml_edit::Item;
use tracing::{debug, warn};

/// Section of a defaults file holding argument defaults
pub const DEFAULTS_SECTION: &str = "commandline-arguments";

/// Name of the per-user and per-directory defaults files
pub const DEFAULTS_FILE: &str = ".projector";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
  Flag(bool),
  Text(String),
  List(Vec<String>),
}

impl ArgValue {
  /// False flags, empty strings and empty lists count as not given
  pub fn is_truthy(&self) -> bool {
    match self {
      ArgValue::Flag(flag) => *flag,
      ArgValue::Text(text) => !text.is_empty(),
      ArgValue::List(list) => !list.is_empty(),
    }
  }

  fn from_item(item: &Item) -> Option<Self> {
    if let Some(flag) = item.as_bool() {
      return Some(ArgValue::Flag(flag));
    }
    if let Some(text) = item.as_str() {
      return Some(ArgValue::Text(text.to_string()));
    }
    let array = item.as_array()?;
    array
      .iter()
      .map(|v| v.as_str().map(str::to_string))
      .collect::<Option<Vec<_>>>()
      .map(ArgValue::List)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
  values: BTreeMap<String, ArgValue>,
}

impl Arguments {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, key: impl Into<String>, value: ArgValue) {
    self.values.insert(key.into(), value);
  }

  pub fn get(&self, key: &str) -> Option<&ArgValue> {
    self.values.get(key)
  }

  /// Whether `key` was given with a truthy value
  pub fn is_set(&self, key: &str) -> bool {
    self.values.get(key).is_some_and(ArgValue::is_truthy)
  }

  pub fn flag(&self, key: &str) -> bool {
    matches!(self.values.get(key), Some(ArgValue::Flag(true)))
  }

  pub fn text(&self, key: &str) -> Option<&str> {
    match self.values.get(key) {
      Some(ArgValue::Text(text)) if !text.is_empty() => Some(text),
      Some(ArgValue::List(list)) => list.first().map(String::as_str),
      _ => None,
    }
  }

  /// A required text argument; its absence is a usage error
  pub fn require_text(&self, key: &str) -> ProjectorResult<&str> {
    self
      .text(key)
      .ok_or_else(|| DispatchError::Usage(format!("missing argument {}", key)).into())
  }

  pub fn list(&self, key: &str) -> Vec<String> {
    match self.values.get(key) {
      Some(ArgValue::List(list)) => list.clone(),
      Some(ArgValue::Text(text)) if !text.is_empty() => vec![text.clone()],
      _ => Vec::new(),
    }
  }

  /// Comma-separated text argument split into its non-empty items
  pub fn comma_list(&self, key: &str) -> Option<Vec<String>> {
    self.text(key).map(|text| {
      text
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
    })
  }

  /// Fill in defaults for arguments that are absent, false or empty
  ///
  /// Returns the keys that took a default.
  pub fn merge_defaults(&mut self, defaults: impl IntoIterator<Item = (String, ArgValue)>) -> Vec<String> {
    let mut applied = Vec::new();
    for (key, value) in defaults {
      if self.is_set(&key) {
        continue;
      }
      debug!(argument = %key, "using default from {}", DEFAULTS_FILE);
      self.values.insert(key.clone(), value);
      applied.push(key);
    }
    applied
  }
}

/// Defaults files in increasing precedence: the user's, then the current directory's
pub fn default_files(cwd: &Path) -> Vec<PathBuf> {
  let mut files = Vec::new();
  if let Some(home) = dirs::home_dir() {
    files.push(home.join(DEFAULTS_FILE));
  }
  files.push(cwd.join(DEFAULTS_FILE));
  files
}

/// Read `[commandline-arguments]` from every existing file in `files`
///
/// A key in a later file replaces the same key from an earlier one. Files
/// that cannot be read or parsed are skipped with a warning.
pub fn load_defaults(files: &[PathBuf]) -> Vec<(String, ArgValue)> {
  let mut merged = BTreeMap::new();
  for file in files {
    if !file.is_file() {
      continue;
    }
    let doc = match ConfigDocument::load_or_empty(file) {
      Ok(doc) => doc,
      Err(err) => {
        warn!("Ignoring defaults file {}: {}", file.display(), err);
        continue;
      }
    };
    for (key, item) in doc.entries(DEFAULTS_SECTION) {
      match ArgValue::from_item(&item) {
        Some(value) => {
          merged.insert(key, value);
        }
        None => warn!("Ignoring default for {} in {}: unsupported value", key, file.display()),
      }
    }
  }
  merged.into_iter().collect()
}
