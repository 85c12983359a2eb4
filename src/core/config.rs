//! Project build configuration (`buildout.toml`)
//!
//! The document is an ordered set of sections, each an ordered map of keys to
//! values. It is edited losslessly through `toml_edit`, so comments and key
//! order written by hand survive every edit.
//!
//! Keys are declared once in [`keys`] as [`ConfigKey`] values carrying their
//! codec, so each caller reads and writes the same shape for the same key.

use crate::core::error::{ConfigError, ProjectorError, ProjectorResult, ResultExt};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use toml_edit::{Array, DocumentMut, Item, Table, Value};

/// File name of the build configuration at the project root
pub const CONFIG_FILE: &str = "buildout.toml";

/// Converts between a stored TOML item and a typed value
pub trait ValueCodec {
  type Value;

  /// Shown in errors when the stored item has the wrong shape
  const EXPECTED: &'static str;

  fn decode(item: &Item) -> Option<Self::Value>;

  fn encode(value: &Self::Value) -> Item;
}

/// A single string
#[derive(Debug, Clone, Copy)]
pub struct Text;

/// A list of strings
///
/// Stored as an array. Newline-separated strings are accepted on read.
#[derive(Debug, Clone, Copy)]
pub struct TextList;

/// Script name to entry point, stored as `["name = module:func", ...]`
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints;

/// A boolean. The strings `true` and `false` are accepted on read.
#[derive(Debug, Clone, Copy)]
pub struct Flag;

impl ValueCodec for Text {
  type Value = String;
  const EXPECTED: &'static str = "a string";

  fn decode(item: &Item) -> Option<String> {
    item.as_str().map(str::to_string)
  }

  fn encode(value: &String) -> Item {
    toml_edit::value(value.as_str())
  }
}

impl ValueCodec for TextList {
  type Value = Vec<String>;
  const EXPECTED: &'static str = "an array of strings";

  fn decode(item: &Item) -> Option<Vec<String>> {
    if let Some(text) = item.as_str() {
      return Some(split_lines(text));
    }
    let array = item.as_array()?;
    array.iter().map(|v| v.as_str().map(str::to_string)).collect()
  }

  fn encode(value: &Vec<String>) -> Item {
    Item::Value(Value::Array(multiline_array(value.iter().map(String::as_str))))
  }
}

impl ValueCodec for EntryPoints {
  type Value = BTreeMap<String, String>;
  const EXPECTED: &'static str = "an array of \"name = entry\" strings";

  fn decode(item: &Item) -> Option<BTreeMap<String, String>> {
    let lines = TextList::decode(item)?;
    lines
      .iter()
      .map(|line| {
        let (name, entry) = line.split_once('=')?;
        Some((name.trim().to_string(), entry.trim().to_string()))
      })
      .collect()
  }

  fn encode(value: &BTreeMap<String, String>) -> Item {
    let lines: Vec<String> = value.iter().map(|(name, entry)| format!("{} = {}", name, entry)).collect();
    TextList::encode(&lines)
  }
}

impl ValueCodec for Flag {
  type Value = bool;
  const EXPECTED: &'static str = "a boolean";

  fn decode(item: &Item) -> Option<bool> {
    if let Some(flag) = item.as_bool() {
      return Some(flag);
    }
    match item.as_str()?.trim().to_ascii_lowercase().as_str() {
      "true" => Some(true),
      "false" => Some(false),
      _ => None,
    }
  }

  fn encode(value: &bool) -> Item {
    toml_edit::value(*value)
  }
}

fn split_lines(text: &str) -> Vec<String> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(str::to_string)
    .collect()
}

fn multiline_array<'a>(values: impl Iterator<Item = &'a str>) -> Array {
  let mut array: Array = values.collect();
  if !array.is_empty() {
    for value in array.iter_mut() {
      value.decor_mut().set_prefix("\n  ");
    }
    array.set_trailing("\n");
    array.set_trailing_comma(true);
  }
  array
}

/// A typed address inside the document: section, key and codec
pub struct ConfigKey<C> {
  section: Cow<'static, str>,
  key: Cow<'static, str>,
  codec: PhantomData<fn() -> C>,
}

impl<C> ConfigKey<C> {
  pub const fn new(section: &'static str, key: &'static str) -> Self {
    Self {
      section: Cow::Borrowed(section),
      key: Cow::Borrowed(key),
      codec: PhantomData,
    }
  }

  /// Key in a section whose name is only known at runtime
  pub fn in_section(section: impl Into<String>, key: impl Into<Cow<'static, str>>) -> Self {
    Self {
      section: Cow::Owned(section.into()),
      key: key.into(),
      codec: PhantomData,
    }
  }

  pub fn section(&self) -> &str {
    &self.section
  }

  pub fn key(&self) -> &str {
    &self.key
  }
}

impl<C> Clone for ConfigKey<C> {
  fn clone(&self) -> Self {
    Self {
      section: self.section.clone(),
      key: self.key.clone(),
      codec: PhantomData,
    }
  }
}

impl<C> fmt::Debug for ConfigKey<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.section, self.key)
  }
}

/// Every key projector reads or writes
pub mod keys {
  use super::{ConfigKey, EntryPoints, Flag, Text, TextList};

  pub const PROJECT: &str = "project";
  pub const BUILDOUT: &str = "buildout";
  pub const VERSIONS_SECTION: &str = "versions";
  pub const JS_VERSIONS_SECTION: &str = "js_versions";
  pub const JS_REQUIREMENTS_SECTION: &str = "js-requirements";

  pub const NAME: ConfigKey<Text> = ConfigKey::new(PROJECT, "name");
  pub const NAMESPACE_PACKAGES: ConfigKey<TextList> = ConfigKey::new(PROJECT, "namespace_packages");
  pub const INSTALL_REQUIRES: ConfigKey<TextList> = ConfigKey::new(PROJECT, "install_requires");
  pub const VERSION_FILE: ConfigKey<Text> = ConfigKey::new(PROJECT, "version_file");
  pub const DESCRIPTION: ConfigKey<Text> = ConfigKey::new(PROJECT, "description");
  pub const LONG_DESCRIPTION: ConfigKey<Text> = ConfigKey::new(PROJECT, "long_description");
  pub const UPGRADE_CODE: ConfigKey<Text> = ConfigKey::new(PROJECT, "upgrade_code");
  pub const PRODUCT_NAME: ConfigKey<Text> = ConfigKey::new(PROJECT, "product_name");
  pub const CONSOLE_SCRIPTS: ConfigKey<EntryPoints> = ConfigKey::new(PROJECT, "console_scripts");
  pub const GUI_SCRIPTS: ConfigKey<EntryPoints> = ConfigKey::new(PROJECT, "gui_scripts");
  pub const PACKAGE_DATA: ConfigKey<TextList> = ConfigKey::new(PROJECT, "package_data");
  pub const POST_INSTALL_SCRIPT: ConfigKey<Text> = ConfigKey::new(PROJECT, "post_install_script_name");
  pub const PRE_UNINSTALL_SCRIPT: ConfigKey<Text> = ConfigKey::new(PROJECT, "pre_uninstall_script_name");

  pub const DEVELOP: ConfigKey<TextList> = ConfigKey::new(BUILDOUT, "develop");
  pub const RELATIVE_PATHS: ConfigKey<Flag> = ConfigKey::new(BUILDOUT, "relative-paths");
  pub const VERSIONS: ConfigKey<Text> = ConfigKey::new(BUILDOUT, "versions");
  pub const JS_VERSIONS: ConfigKey<Flag> = ConfigKey::new(BUILDOUT, "js_versions");
  pub const DOWNLOAD_CACHE: ConfigKey<Text> = ConfigKey::new(BUILDOUT, "download-cache");

  pub const JS_PACKAGES: ConfigKey<TextList> = ConfigKey::new(JS_REQUIREMENTS_SECTION, "javascript-packages");
  pub const JS_DIRECTORY: ConfigKey<Text> = ConfigKey::new(JS_REQUIREMENTS_SECTION, "js-directory");

  pub fn recipe(section: &str) -> ConfigKey<Text> {
    ConfigKey::in_section(section, "recipe")
  }

  pub fn eggs(section: &str) -> ConfigKey<TextList> {
    ConfigKey::in_section(section, "eggs")
  }

  pub fn python_version(section: &str) -> ConfigKey<Text> {
    ConfigKey::in_section(section, "version")
  }
}

/// An open build configuration document
#[derive(Debug)]
pub struct ConfigDocument {
  path: PathBuf,
  doc: DocumentMut,
}

impl ConfigDocument {
  /// Read and parse the document at `path`
  pub fn load(path: &Path) -> ProjectorResult<Self> {
    if !path.exists() {
      return Err(ConfigError::NotFound { path: path.to_path_buf() }.into());
    }
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Self::parse(path, &text)
  }

  /// Like [`ConfigDocument::load`], but a missing file yields an empty document
  pub fn load_or_empty(path: &Path) -> ProjectorResult<Self> {
    if path.exists() {
      Self::load(path)
    } else {
      Self::parse(path, "")
    }
  }

  pub fn parse(path: &Path, text: &str) -> ProjectorResult<Self> {
    let doc = text.parse::<DocumentMut>().map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    Ok(Self {
      path: path.to_path_buf(),
      doc,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Names of all sections in document order
  pub fn sections(&self) -> Vec<String> {
    self
      .doc
      .iter()
      .filter(|(_, item)| item.is_table_like())
      .map(|(name, _)| name.to_string())
      .collect()
  }

  pub fn has_section(&self, section: &str) -> bool {
    self.doc.get(section).is_some_and(Item::is_table_like)
  }

  /// Create `section` if it does not exist yet
  pub fn add_section(&mut self, section: &str) {
    if !self.has_section(section) {
      self.doc.insert(section, Item::Table(Table::new()));
    }
  }

  pub fn remove_section(&mut self, section: &str) -> bool {
    self.doc.remove(section).is_some()
  }

  pub fn has_key(&self, section: &str, key: &str) -> bool {
    self.item(section, key).is_some()
  }

  pub fn remove_key(&mut self, section: &str, key: &str) -> bool {
    self
      .doc
      .get_mut(section)
      .and_then(Item::as_table_like_mut)
      .and_then(|table| table.remove(key))
      .is_some()
  }

  /// Keys and raw items of a section, in document order
  pub fn entries(&self, section: &str) -> Vec<(String, Item)> {
    self
      .doc
      .get(section)
      .and_then(Item::as_table_like)
      .map(|table| table.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
      .unwrap_or_default()
  }

  fn item(&self, section: &str, key: &str) -> Option<&Item> {
    self.doc.get(section)?.as_table_like()?.get(key)
  }

  /// Read a typed key; `None` when the key is absent
  pub fn get<C: ValueCodec>(&self, key: &ConfigKey<C>) -> ProjectorResult<Option<C::Value>> {
    let Some(item) = self.item(key.section(), key.key()) else {
      return Ok(None);
    };
    C::decode(item).map(Some).ok_or_else(|| {
      ProjectorError::from(ConfigError::InvalidValue {
        section: key.section().to_string(),
        key: key.key().to_string(),
        expected: C::EXPECTED,
      })
    })
  }

  pub fn get_or_default<C>(&self, key: &ConfigKey<C>) -> ProjectorResult<C::Value>
  where
    C: ValueCodec,
    C::Value: Default,
  {
    Ok(self.get(key)?.unwrap_or_default())
  }

  /// Write a typed key, creating its section when needed
  pub fn set<C: ValueCodec>(&mut self, key: &ConfigKey<C>, value: &C::Value) {
    self.add_section(key.section());
    if let Some(table) = self.doc.get_mut(key.section()).and_then(Item::as_table_like_mut) {
      table.insert(key.key(), C::encode(value));
    }
  }

  pub fn remove<C>(&mut self, key: &ConfigKey<C>) -> bool {
    self.remove_key(key.section(), key.key())
  }

  /// Sections whose `recipe` satisfies `matches`
  pub fn sections_with_recipe(&self, matches: impl Fn(&str) -> bool) -> Vec<String> {
    self
      .sections()
      .into_iter()
      .filter(|section| {
        self
          .item(section, "recipe")
          .and_then(Item::as_str)
          .is_some_and(|recipe| matches(recipe))
      })
      .collect()
  }

  /// The first section whose recipe is exactly `recipe`
  pub fn section_by_recipe(&self, recipe: &str) -> ProjectorResult<String> {
    self
      .sections_with_recipe(|r| r == recipe)
      .into_iter()
      .next()
      .ok_or_else(|| ConfigError::RecipeNotFound { recipe: recipe.to_string() }.into())
  }

  /// Write the document back, replacing the file atomically
  pub fn save(&self) -> ProjectorResult<()> {
    let file_name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_else(|| CONFIG_FILE.to_string());
    let tmp = self.path.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp, self.doc.to_string()).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;
    Ok(())
  }
}

impl fmt::Display for ConfigDocument {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.doc)
  }
}

/// Open the document read-only for the duration of `f`
pub fn read_config<T>(path: &Path, f: impl FnOnce(&ConfigDocument) -> ProjectorResult<T>) -> ProjectorResult<T> {
  let doc = ConfigDocument::load(path)?;
  f(&doc)
}

/// Open the document for the duration of `f` and write it back when `f` succeeds
pub fn edit_config<T>(path: &Path, f: impl FnOnce(&mut ConfigDocument) -> ProjectorResult<T>) -> ProjectorResult<T> {
  let mut doc = ConfigDocument::load(path)?;
  let result = f(&mut doc)?;
  doc.save()?;
  Ok(result)
}
