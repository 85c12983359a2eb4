use crate::core::build::CONSOLE_SCRIPTS_RECIPE;
use crate::core::config::{ConfigDocument, ConfigKey, EntryPoints, TextList, keys};
use crate::core::error::ProjectorResult;
use std::collections::BTreeMap;

/// A set of strings stored as a list value, kept in insertion order
#[derive(Debug, Clone)]
pub struct ListSet {
  key: ConfigKey<TextList>,
}

impl ListSet {
  pub fn new(key: ConfigKey<TextList>) -> Self {
    Self { key }
  }

  pub fn install_requires() -> Self {
    Self::new(keys::INSTALL_REQUIRES)
  }

  /// `eggs` of the section installing the development scripts
  pub fn development_eggs(doc: &ConfigDocument) -> ProjectorResult<Self> {
    let section = doc.section_by_recipe(CONSOLE_SCRIPTS_RECIPE)?;
    Ok(Self::new(keys::eggs(&section)))
  }

  pub fn package_data() -> Self {
    Self::new(keys::PACKAGE_DATA)
  }

  pub fn js_packages() -> Self {
    Self::new(keys::JS_PACKAGES)
  }

  pub fn get(&self, doc: &ConfigDocument) -> ProjectorResult<Vec<String>> {
    doc.get_or_default(&self.key)
  }

  /// Returns whether `item` was new
  pub fn add(&self, doc: &mut ConfigDocument, item: &str) -> ProjectorResult<bool> {
    let mut items = self.get(doc)?;
    if items.iter().any(|existing| existing == item) {
      return Ok(false);
    }
    items.push(item.to_string());
    doc.set(&self.key, &items);
    Ok(true)
  }

  /// Returns whether `item` was present
  pub fn remove(&self, doc: &mut ConfigDocument, item: &str) -> ProjectorResult<bool> {
    let mut items = self.get(doc)?;
    let before = items.len();
    items.retain(|existing| existing != item);
    if items.len() == before {
      return Ok(false);
    }
    doc.set(&self.key, &items);
    Ok(true)
  }
}

/// Script names mapped to entry points
#[derive(Debug, Clone)]
pub struct EntryPointSet {
  key: ConfigKey<EntryPoints>,
}

impl EntryPointSet {
  pub fn console_scripts() -> Self {
    Self { key: keys::CONSOLE_SCRIPTS }
  }

  pub fn gui_scripts() -> Self {
    Self { key: keys::GUI_SCRIPTS }
  }

  pub fn get(&self, doc: &ConfigDocument) -> ProjectorResult<BTreeMap<String, String>> {
    doc.get_or_default(&self.key)
  }

  /// Add or replace the entry point of `name`
  pub fn insert(&self, doc: &mut ConfigDocument, name: &str, entry_point: &str) -> ProjectorResult<()> {
    let mut scripts = self.get(doc)?;
    scripts.insert(name.to_string(), entry_point.to_string());
    doc.set(&self.key, &scripts);
    Ok(())
  }

  pub fn remove(&self, doc: &mut ConfigDocument, name: &str) -> ProjectorResult<bool> {
    let mut scripts = self.get(doc)?;
    if scripts.remove(name).is_none() {
      return Ok(false);
    }
    doc.set(&self.key, &scripts);
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::CONFIG_FILE;
  use crate::core::error::{ConfigError, ProjectorError};
  use std::path::Path;

  fn doc(text: &str) -> ConfigDocument {
    ConfigDocument::parse(Path::new(CONFIG_FILE), text).unwrap()
  }

  #[test]
  fn test_list_add_and_remove() {
    let mut doc = doc("[project]\ninstall_requires = [\"setuptools\"]\n");
    let set = ListSet::install_requires();

    assert!(set.add(&mut doc, "six").unwrap());
    assert!(!set.add(&mut doc, "six").unwrap());
    assert_eq!(set.get(&doc).unwrap(), vec!["setuptools", "six"]);

    assert!(set.remove(&mut doc, "setuptools").unwrap());
    assert!(!set.remove(&mut doc, "missing").unwrap());
    assert_eq!(set.get(&doc).unwrap(), vec!["six"]);
  }

  #[test]
  fn test_missing_list_starts_empty() {
    let mut doc = doc("");
    let set = ListSet::package_data();
    assert!(set.get(&doc).unwrap().is_empty());
    set.add(&mut doc, "*.json").unwrap();
    assert_eq!(set.get(&doc).unwrap(), vec!["*.json"]);
  }

  #[test]
  fn test_development_eggs_follow_recipe() {
    let mut doc = doc("[dev]\nrecipe = \"infi.recipe.console_scripts\"\neggs = \"\"\"\nipython\n\"\"\"\n");
    let set = ListSet::development_eggs(&doc).unwrap();
    set.add(&mut doc, "nose").unwrap();
    assert_eq!(doc.get_or_default(&keys::eggs("dev")).unwrap(), vec!["ipython", "nose"]);

    let err = ListSet::development_eggs(&ConfigDocument::parse(Path::new(CONFIG_FILE), "").unwrap()).unwrap_err();
    assert!(matches!(err, ProjectorError::Config(ConfigError::RecipeNotFound { .. })));
  }

  #[test]
  fn test_entry_points() {
    let mut doc = doc("[project]\nconsole_scripts = []\n");
    let set = EntryPointSet::console_scripts();

    set.insert(&mut doc, "hello", "infi.hello:main").unwrap();
    set.insert(&mut doc, "hello", "infi.hello:run").unwrap();
    assert_eq!(set.get(&doc).unwrap().get("hello").map(String::as_str), Some("infi.hello:run"));
    assert!(doc.to_string().contains("\"hello = infi.hello:run\""));

    assert!(set.remove(&mut doc, "hello").unwrap());
    assert!(!set.remove(&mut doc, "hello").unwrap());
    assert!(EntryPointSet::gui_scripts().get(&doc).unwrap().is_empty());
  }
}
