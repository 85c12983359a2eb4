//! Plugin registry
//!
//! Plugins are validated when registered. A plugin that breaks the contract is
//! logged and left out, it never aborts the run.

use super::CommandPlugin;
use crate::commands;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::error;

/// Why a plugin was excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
  pub plugin: String,
  /// Contract member at fault: `command_name`, `grammar` or `handlers`
  pub member: &'static str,
  pub reason: String,
}

impl fmt::Display for ContractViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Plugin {} does not override {}: {}", self.plugin, self.member, self.reason)
  }
}

/// Check a plugin against the contract
pub fn validate(plugin: &dyn CommandPlugin) -> Result<(), ContractViolation> {
  let name = plugin.command_name().trim().to_string();
  let violation = |member: &'static str, reason: String| ContractViolation {
    plugin: if name.is_empty() { "<unnamed>".to_string() } else { name.clone() },
    member,
    reason,
  };

  if name.is_empty() {
    return Err(violation("command_name", "command name is empty".to_string()));
  }

  let grammar = plugin.grammar();
  if grammar.get_name() != name {
    return Err(violation(
      "grammar",
      format!("grammar is named '{}' instead of '{}'", grammar.get_name(), name),
    ));
  }
  let subcommands: BTreeSet<&str> = grammar.get_subcommands().map(|c| c.get_name()).collect();
  if subcommands.is_empty() {
    return Err(violation("grammar", "grammar declares no sub-commands".to_string()));
  }

  let handlers = plugin.handlers();
  if handlers.is_empty() {
    return Err(violation("handlers", "no handlers declared".to_string()));
  }
  if let Some(orphan) = handlers.iter().find(|h| !subcommands.contains(h.name)) {
    return Err(violation(
      "handlers",
      format!("handler '{}' has no matching sub-command", orphan.name),
    ));
  }
  Ok(())
}

/// The active set of plugins
#[derive(Default)]
pub struct PluginRegistry {
  plugins: Vec<Arc<dyn CommandPlugin>>,
  violations: Vec<ContractViolation>,
}

impl PluginRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry holding the built-in commands
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    registry.extend(commands::builtin_plugins());
    registry
  }

  /// Built-in registry, created once per process
  pub fn builtin() -> &'static PluginRegistry {
    static REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();
    REGISTRY.get_or_init(Self::with_builtins)
  }

  /// Register every plugin of an extension list
  pub fn extend(&mut self, plugins: impl IntoIterator<Item = Arc<dyn CommandPlugin>>) {
    for plugin in plugins {
      self.register(plugin);
    }
  }

  /// Validate and add `plugin`; returns whether it was accepted
  pub fn register(&mut self, plugin: Arc<dyn CommandPlugin>) -> bool {
    let result = validate(plugin.as_ref()).and_then(|()| {
      if self.find(plugin.command_name()).is_some() {
        return Err(ContractViolation {
          plugin: plugin.command_name().to_string(),
          member: "command_name",
          reason: "another plugin already handles this command".to_string(),
        });
      }
      Ok(())
    });

    match result {
      Ok(()) => {
        self.plugins.push(plugin);
        true
      }
      Err(violation) => {
        error!(plugin = %violation.plugin, member = violation.member, "{}", violation);
        self.violations.push(violation);
        false
      }
    }
  }

  /// Accepted plugins, ordered by command name
  pub fn plugins(&self) -> Vec<Arc<dyn CommandPlugin>> {
    let mut plugins = self.plugins.clone();
    plugins.sort_by(|a, b| a.command_name().cmp(b.command_name()));
    plugins
  }

  pub fn find(&self, command_name: &str) -> Option<Arc<dyn CommandPlugin>> {
    self.plugins.iter().find(|p| p.command_name() == command_name).cloned()
  }

  /// Plugins rejected so far
  pub fn violations(&self) -> &[ContractViolation] {
    &self.violations
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::error::ProjectorResult;
  use crate::plugin::{Handler, PluginContext};
  use clap::Command;

  fn noop(_ctx: &PluginContext) -> ProjectorResult<()> {
    Ok(())
  }

  struct TestPlugin {
    name: &'static str,
    grammar_name: &'static str,
    subcommands: &'static [&'static str],
    handlers: &'static [&'static str],
  }

  impl CommandPlugin for TestPlugin {
    fn command_name(&self) -> &str {
      self.name
    }

    fn grammar(&self) -> Command {
      Command::new(self.grammar_name).subcommands(self.subcommands.iter().map(|s| Command::new(*s)))
    }

    fn handlers(&self) -> Vec<Handler> {
      self.handlers.iter().map(|h| Handler::new(*h, noop)).collect()
    }
  }

  fn plugin(
    name: &'static str,
    grammar_name: &'static str,
    subcommands: &'static [&'static str],
    handlers: &'static [&'static str],
  ) -> Arc<dyn CommandPlugin> {
    Arc::new(TestPlugin {
      name,
      grammar_name,
      subcommands,
      handlers,
    })
  }

  #[test]
  fn test_valid_plugin_is_registered() {
    let mut registry = PluginRegistry::new();
    assert!(registry.register(plugin("widgets", "widgets", &["list"], &["list"])));
    assert!(registry.find("widgets").is_some());
    assert!(registry.violations().is_empty());
  }

  #[test]
  fn test_violations_name_the_missing_member() {
    let cases = [
      (plugin("", "", &["list"], &["list"]), "command_name"),
      (plugin("widgets", "gadgets", &["list"], &["list"]), "grammar"),
      (plugin("widgets", "widgets", &[], &["list"]), "grammar"),
      (plugin("widgets", "widgets", &["list"], &[]), "handlers"),
      (plugin("widgets", "widgets", &["list"], &["list", "add"]), "handlers"),
    ];
    for (candidate, member) in cases {
      let mut registry = PluginRegistry::new();
      assert!(!registry.register(candidate));
      assert_eq!(registry.violations()[0].member, member);
      assert!(registry.plugins().is_empty());
    }
  }

  #[test]
  fn test_duplicate_command_is_rejected() {
    let mut registry = PluginRegistry::new();
    registry.extend([
      plugin("widgets", "widgets", &["list"], &["list"]),
      plugin("widgets", "widgets", &["add"], &["add"]),
    ]);
    assert_eq!(registry.plugins().len(), 1);
    assert_eq!(registry.violations()[0].member, "command_name");
  }

  #[test]
  fn test_plugins_sorted_by_name() {
    let mut registry = PluginRegistry::new();
    registry.extend([
      plugin("version", "version", &["release"], &["release"]),
      plugin("devenv", "devenv", &["build"], &["build"]),
    ]);
    let names: Vec<String> = registry.plugins().iter().map(|p| p.command_name().to_string()).collect();
    assert_eq!(names, vec!["devenv", "version"]);
  }

  #[test]
  fn test_builtin_plugins_are_all_valid() {
    let registry = PluginRegistry::with_builtins();
    assert!(registry.violations().is_empty(), "{:?}", registry.violations());
    let names: Vec<String> = registry.plugins().iter().map(|p| p.command_name().to_string()).collect();
    assert_eq!(
      names,
      vec![
        "console-scripts",
        "devenv",
        "gui-scripts",
        "isolated-python",
        "js-requirements",
        "package-data",
        "package-scripts",
        "repository",
        "requirements",
        "submodule",
        "version",
      ]
    );
  }
}
