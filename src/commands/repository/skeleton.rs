//! Files every new project starts with

use crate::core::config::{ConfigDocument, ConfigKey, EntryPoints, Text, TextList, keys};
use crate::core::error::{ProjectorResult, ResultExt};
use std::fs;
use std::path::Path;
use tracing::info;

/// A file shipped with projector and copied into projects
#[derive(Debug, Clone, Copy)]
pub struct SkeletonFile {
  pub name: &'static str,
  pub content: &'static str,
}

pub const GITIGNORE: SkeletonFile = SkeletonFile {
  name: ".gitignore",
  content: include_str!("skeleton/.gitignore"),
};

pub const README: SkeletonFile = SkeletonFile {
  name: "README.md",
  content: include_str!("skeleton/README.md"),
};

pub const BUILDOUT: SkeletonFile = SkeletonFile {
  name: "buildout.toml",
  content: include_str!("skeleton/buildout.toml"),
};

pub const SETUP_IN: SkeletonFile = SkeletonFile {
  name: "setup.in",
  content: include_str!("skeleton/setup.in"),
};

/// Written by `repository init`
pub const INITIAL_FILES: &[SkeletonFile] = &[GITIGNORE, README, BUILDOUT, SETUP_IN];

/// Overwritten by `repository skeleton update`
pub const UPDATED_FILES: &[SkeletonFile] = &[BUILDOUT, SETUP_IN];

/// Files earlier generations of the skeleton shipped
pub const DEPRECATED_FILES: &[&str] = &[
  "buildout-git.cfg",
  "buildout-version.cfg",
  "buildout-pack.cfg",
  "buildout-dist.cfg",
  "buildout.in",
  "buildout.cfg",
  "bootstrap.py",
];

/// Always present in a project's `.gitignore`
pub const IGNORED_DOWNLOADS: &str = "get-pip.py";

pub fn write_files(root: &Path, files: &[SkeletonFile]) -> ProjectorResult<()> {
  for file in files {
    let path = root.join(file.name);
    info!("Writing {}", file.name);
    fs::write(&path, file.content).with_context(|| format!("Failed to write {}", path.display()))?;
  }
  Ok(())
}

/// `[project]` keys that survive a skeleton update
#[derive(Debug, Clone, Default)]
pub struct ProjectBackup {
  texts: Vec<(ConfigKey<Text>, Option<String>)>,
  lists: Vec<(ConfigKey<TextList>, Vec<String>)>,
  console_scripts: Vec<(String, String)>,
}

const BACKED_UP_TEXTS: [ConfigKey<Text>; 5] = [
  keys::NAME,
  keys::VERSION_FILE,
  keys::DESCRIPTION,
  keys::LONG_DESCRIPTION,
  keys::UPGRADE_CODE,
];

const BACKED_UP_LISTS: [ConfigKey<TextList>; 3] = [keys::NAMESPACE_PACKAGES, keys::INSTALL_REQUIRES, keys::PACKAGE_DATA];

const BACKED_UP_ENTRY_POINTS: ConfigKey<EntryPoints> = keys::CONSOLE_SCRIPTS;

impl ProjectBackup {
  pub fn capture(doc: &ConfigDocument) -> ProjectorResult<Self> {
    let mut backup = Self::default();
    for key in BACKED_UP_TEXTS {
      let value = doc.get(&key)?;
      backup.texts.push((key, value));
    }
    for key in BACKED_UP_LISTS {
      let value = doc.get_or_default(&key)?;
      backup.lists.push((key, value));
    }
    backup.console_scripts = doc.get_or_default(&BACKED_UP_ENTRY_POINTS)?.into_iter().collect();
    Ok(backup)
  }

  /// Write the captured keys into `doc`; keys that were absent stay untouched
  pub fn restore(&self, doc: &mut ConfigDocument) {
    for (key, value) in &self.texts {
      if let Some(value) = value {
        doc.set(key, value);
      }
    }
    for (key, value) in &self.lists {
      doc.set(key, value);
    }
    doc.set(&BACKED_UP_ENTRY_POINTS, &self.console_scripts.iter().cloned().collect());
  }
}
