//! Combined usage text and argument flattening
//!
//! Plugins declare their grammar with clap. The dispatcher mounts every
//! grammar under one root command, renders a single usage text in the
//! docopt style users know from `projector --help`, and flattens clap's
//! nested matches into an [`Arguments`] map.

use super::arguments::{ArgValue, Arguments};
use clap::{Arg, ArgAction, ArgMatches, Command};

/// Id of the global version flag
pub const VERSION_FLAG: &str = "version";

const GLOBAL_OPTIONS: &[(&str, &str)] = &[("-h --help", "show this screen"), ("-v --version", "show version")];

/// Root command with every plugin grammar mounted as a sub-command
///
/// `plugins` must already be sorted by command name.
pub fn root_command(version: &'static str, plugins: Vec<Command>) -> Command {
  let help = render_help(version, &plugins);
  Command::new("projector")
    .version(version)
    .disable_version_flag(true)
    .override_help(help)
    .styles(crate::ui::styles())
    .arg(
      Arg::new(VERSION_FLAG)
        .short('v')
        .long("version")
        .action(ArgAction::SetTrue)
        .help("show version"),
    )
    .subcommands(plugins)
}

/// Key of an argument in the flattened map
fn argument_key(arg: &Arg) -> String {
  if arg.is_positional() {
    format!("<{}>", arg.get_id())
  } else {
    format!("--{}", arg.get_long().unwrap_or(arg.get_id().as_str()))
  }
}

fn takes_value(arg: &Arg) -> bool {
  arg.get_action().takes_values()
}

fn is_builtin(arg: &Arg) -> bool {
  matches!(arg.get_id().as_str(), "help" | "version") && !arg.is_positional()
}

/// Flatten the matches of `command` into docopt-style keys
///
/// Every sub-command on the matched path becomes a true flag.
pub fn flatten(command: &Command, matches: &ArgMatches) -> Arguments {
  let mut arguments = Arguments::new();
  if let Some((name, sub_matches)) = matches.subcommand()
    && let Some(sub) = command.find_subcommand(name)
  {
    collect(sub, sub_matches, &mut arguments);
  }
  arguments
}

fn collect(command: &Command, matches: &ArgMatches, arguments: &mut Arguments) {
  arguments.insert(command.get_name(), ArgValue::Flag(true));
  for arg in command.get_arguments().filter(|a| !is_builtin(a)) {
    let id = arg.get_id().as_str();
    let key = argument_key(arg);
    if takes_value(arg) {
      let Some(values) = matches.get_many::<String>(id) else {
        continue;
      };
      let values: Vec<String> = values.cloned().collect();
      let multiple = arg.get_num_args().is_some_and(|range| range.max_values() > 1)
        || matches!(arg.get_action(), ArgAction::Append);
      if multiple {
        arguments.insert(key, ArgValue::List(values));
      } else if let Some(value) = values.into_iter().next() {
        arguments.insert(key, ArgValue::Text(value));
      }
    } else if matches!(arg.get_action(), ArgAction::SetTrue) {
      arguments.insert(key, ArgValue::Flag(matches.get_flag(id)));
    }
  }
  if let Some((name, sub_matches)) = matches.subcommand()
    && let Some(sub) = command.find_subcommand(name)
  {
    collect(sub, sub_matches, arguments);
  }
}

/// One line per leaf sub-command, e.g. `projector version upload <version> [--distributions=DISTRIBUTIONS]`
fn usage_lines(command: &Command, prefix: &str, lines: &mut Vec<String>) {
  let path = format!("{} {}", prefix, command.get_name());
  if command.has_subcommands() {
    for sub in command.get_subcommands() {
      usage_lines(sub, &path, lines);
    }
    return;
  }

  let mut line = path;
  let args: Vec<&Arg> = command.get_arguments().filter(|a| !is_builtin(a)).collect();
  for arg in args.iter().filter(|a| a.is_positional()) {
    let mut term = format!("<{}>", arg.get_id());
    if arg.get_num_args().is_some_and(|range| range.max_values() > 1) {
      term.push_str("...");
    }
    if arg.is_required_set() {
      line.push_str(&format!(" {}", term));
    } else {
      line.push_str(&format!(" [{}]", term));
    }
  }
  for arg in args.iter().filter(|a| !a.is_positional()) {
    let term = option_term(arg);
    if arg.is_required_set() {
      line.push_str(&format!(" {}", term));
    } else {
      line.push_str(&format!(" [{}]", term));
    }
  }
  lines.push(line);
}

fn option_term(arg: &Arg) -> String {
  let long = format!("--{}", arg.get_long().unwrap_or(arg.get_id().as_str()));
  if takes_value(arg) {
    let value = arg
      .get_value_names()
      .and_then(|names| names.first().map(|n| n.to_string()))
      .unwrap_or_else(|| arg.get_id().as_str().to_uppercase());
    format!("{}={}", long, value)
  } else {
    long
  }
}

fn option_lines(command: &Command, lines: &mut Vec<(String, String)>) {
  for arg in command.get_arguments().filter(|a| !is_builtin(a)) {
    let Some(help) = arg.get_help() else {
      continue;
    };
    let term = if arg.is_positional() {
      format!("<{}>", arg.get_id())
    } else {
      option_term(arg)
    };
    let mut help = help.to_string();
    if let Some(default) = arg.get_default_values().first() {
      help.push_str(&format!(" [default: {}]", default.to_string_lossy()));
    }
    lines.push((term, help));
  }
  for sub in command.get_subcommands() {
    option_lines(sub, lines);
  }
}

/// Positional placeholders first, then options, then anything else
fn option_rank(term: &str) -> u8 {
  if term.starts_with('<') {
    0
  } else if term.starts_with('-') {
    1
  } else {
    2
  }
}

/// Combined usage text for all plugin grammars
pub fn render_help(version: &str, plugins: &[Command]) -> String {
  let mut usage = vec!["projector -h | --help".to_string(), "projector -v | --version".to_string()];
  for plugin in plugins {
    let mut lines = Vec::new();
    usage_lines(plugin, "projector", &mut lines);
    usage.extend(lines);
  }

  let mut options: Vec<(String, String)> = GLOBAL_OPTIONS
    .iter()
    .map(|(term, help)| (term.to_string(), help.to_string()))
    .collect();
  for plugin in plugins {
    option_lines(plugin, &mut options);
  }
  let mut unique: Vec<(String, String)> = Vec::new();
  for option in options {
    if !unique.contains(&option) {
      unique.push(option);
    }
  }
  unique.sort_by_key(|(term, _)| option_rank(term));

  let width = unique.iter().map(|(term, _)| term.len()).max().unwrap_or(0) + 4;
  let mut text = format!("projector {}\n\nUsage:\n", version);
  for line in usage {
    text.push_str(&format!("    {}\n", line));
  }
  text.push_str("\nOptions:\n");
  for (term, help) in unique {
    text.push_str(&format!("    {:<width$}{}\n", term, help, width = width));
  }
  text
}

#[cfg(test)]
mod tests {
  use super::*;

  fn widgets() -> Command {
    Command::new("widgets")
      .subcommand(
        Command::new("add")
          .arg(Arg::new("name").required(true).help("widget name"))
          .arg(
            Arg::new("commit-changes")
              .long("commit-changes")
              .action(ArgAction::SetTrue)
              .help("commit the configuration"),
          )
          .arg(Arg::new("color").long("color").value_name("COLOR").help("widget color")),
      )
      .subcommand(Command::new("list"))
  }

  fn gadgets() -> Command {
    Command::new("gadgets").subcommand(
      Command::new("set").subcommand(
        Command::new("size")
          .arg(Arg::new("size").required(true).help("gadget size"))
          .arg(
            Arg::new("commit-changes")
              .long("commit-changes")
              .action(ArgAction::SetTrue)
              .help("commit the configuration"),
          ),
      ),
    )
  }

  #[test]
  fn test_flatten_nested_matches() {
    let root = root_command("1.0", vec![gadgets(), widgets()]);
    let matches = root
      .clone()
      .try_get_matches_from(["projector", "widgets", "add", "gizmo", "--color=red"])
      .unwrap();
    let args = flatten(&root, &matches);

    assert!(args.flag("widgets"));
    assert!(args.flag("add"));
    assert!(!args.is_set("list"));
    assert!(!args.is_set("gadgets"));
    assert_eq!(args.text("<name>"), Some("gizmo"));
    assert_eq!(args.text("--color"), Some("red"));
    assert_eq!(args.get("--commit-changes"), Some(&ArgValue::Flag(false)));

    let matches = root
      .clone()
      .try_get_matches_from(["projector", "gadgets", "set", "size", "3"])
      .unwrap();
    let args = flatten(&root, &matches);
    assert!(args.flag("gadgets") && args.flag("set") && args.flag("size"));
    assert_eq!(args.text("<size>"), Some("3"));
  }

  #[test]
  fn test_help_lists_usage_per_leaf() {
    let help = render_help("1.0", &[gadgets(), widgets()]);
    let usage: Vec<&str> = help
      .lines()
      .skip_while(|l| *l != "Usage:")
      .skip(1)
      .take_while(|l| !l.is_empty())
      .map(str::trim)
      .collect();
    assert_eq!(
      usage,
      vec![
        "projector -h | --help",
        "projector -v | --version",
        "projector gadgets set size <size> [--commit-changes]",
        "projector widgets add <name> [--commit-changes] [--color=COLOR]",
        "projector widgets list",
      ]
    );
  }

  #[test]
  fn test_help_orders_and_dedups_options() {
    let help = render_help("1.0", &[gadgets(), widgets()]);
    let terms: Vec<&str> = help
      .lines()
      .skip_while(|l| *l != "Options:")
      .skip(1)
      .filter_map(|l| l.split_whitespace().next())
      .collect();
    assert_eq!(terms, vec!["<size>", "<name>", "-h", "-v", "--commit-changes", "--color=COLOR"]);
  }
}
