//! Version tag arithmetic
//!
//! A selector names the version a command acts on: a literal (`1.2`,
//! `v1.2.3`), an increment (`major`, `minor`, `trivial`) computed from
//! `git describe`, or one of the upload-only selectors `current`/`latest`.

use crate::core::error::{ProjectorResult, VersionError};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Parsed `<version>` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
  Literal(String),
  Increment(Component),
  /// Upload the commit at HEAD
  Current,
  /// Upload the highest release tag
  Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
  Major,
  Minor,
  Trivial,
}

impl Component {
  fn index(self) -> usize {
    match self {
      Component::Major => 0,
      Component::Minor => 1,
      Component::Trivial => 2,
    }
  }

  /// Number of components kept in the resulting version
  fn precision(self) -> usize {
    match self {
      Component::Major | Component::Minor => 2,
      Component::Trivial => 3,
    }
  }
}

impl VersionSelector {
  pub fn parse(text: &str) -> Self {
    match text {
      "major" => VersionSelector::Increment(Component::Major),
      "minor" => VersionSelector::Increment(Component::Minor),
      "trivial" => VersionSelector::Increment(Component::Trivial),
      "current" => VersionSelector::Current,
      "latest" => VersionSelector::Latest,
      other => VersionSelector::Literal(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      VersionSelector::Literal(text) => text,
      VersionSelector::Increment(Component::Major) => "major",
      VersionSelector::Increment(Component::Minor) => "minor",
      VersionSelector::Increment(Component::Trivial) => "trivial",
      VersionSelector::Current => "current",
      VersionSelector::Latest => "latest",
    }
  }
}

/// Version to release for `selector`, given the `git describe --tags` output
///
/// Literals are returned unchanged. `current` and `latest` cannot be released.
pub fn resolve_version_tag(selector: &VersionSelector, describe: &str) -> ProjectorResult<String> {
  match selector {
    VersionSelector::Literal(text) => Ok(text.clone()),
    VersionSelector::Current | VersionSelector::Latest => Err(
      VersionError::UploadOnlySelector {
        selector: selector.as_str().to_string(),
      }
      .into(),
    ),
    VersionSelector::Increment(component) => increment(describe, *component),
  }
}

fn increment(describe: &str, component: Component) -> ProjectorResult<String> {
  let invalid = || VersionError::InvalidDescription {
    description: describe.to_string(),
  };
  let base = describe.trim().trim_start_matches('v');
  let base = base.split('-').next().unwrap_or_default();
  let mut numbers = base
    .split('.')
    .map(|part| part.parse::<u64>())
    .collect::<Result<Vec<_>, _>>()
    .map_err(|_| invalid())?;

  numbers.truncate(component.index() + 1);
  numbers.resize(3, 0);
  let index = component.index();
  numbers[index] = numbers[index].checked_add(1).ok_or_else(invalid)?;
  numbers.truncate(component.precision());
  Ok(join(&numbers))
}

fn join(numbers: &[u64]) -> String {
  numbers.iter().map(u64::to_string).collect::<Vec<_>>().join(".")
}

/// Tag name for a version: exactly one leading `v`
pub fn tag_name(version: &str) -> String {
  format!("v{}", version.trim_start_matches('v'))
}

fn release_tag_pattern() -> Option<&'static Regex> {
  static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^v(\d+(?:\.\d+)*)").ok()).as_ref()
}

/// Numeric components of a release tag, `None` for other tags
fn release_key(tag: &str) -> Option<Vec<u64>> {
  let captures = release_tag_pattern()?.captures(tag)?;
  captures[1].split('.').map(|n| n.parse().ok()).collect()
}

fn compare_versions(a: &[u64], b: &[u64]) -> Ordering {
  let len = a.len().max(b.len());
  let pad = |v: &[u64]| {
    let mut v = v.to_vec();
    v.resize(len, 0);
    v
  };
  pad(a).cmp(&pad(b))
}

/// Highest release tag, skipping tags that carry `excluded_suffix`
pub fn latest_release_tag<'a>(tags: impl IntoIterator<Item = &'a String>, excluded_suffix: &str) -> Option<String> {
  tags
    .into_iter()
    .filter(|tag| !tag.ends_with(excluded_suffix))
    .filter_map(|tag| release_key(tag).map(|key| (key, tag)))
    .max_by(|(a, tag_a), (b, tag_b)| compare_versions(a, b).then_with(|| tag_a.cmp(tag_b)))
    .map(|(_, tag)| tag.clone())
}
