//! Terminal output: log formatting, clap colors and progress bars

pub mod progress;

use anstyle::{AnsiColor, Color, Style};
use clap::builder::Styles;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber: compact lines on stderr, `info` unless `RUST_LOG` says otherwise
///
/// Only the first call takes effect.
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
    .try_init()
    .ok();
}

fn colored(color: AnsiColor) -> Style {
  Style::new().fg_color(Some(Color::Ansi(color)))
}

/// Colors for clap's usage errors
pub fn styles() -> Styles {
  Styles::styled()
    .usage(colored(AnsiColor::Yellow).bold().underline())
    .header(colored(AnsiColor::Yellow).bold().underline())
    .literal(colored(AnsiColor::Green))
    .invalid(colored(AnsiColor::Red).bold())
    .error(colored(AnsiColor::Red).bold())
    .valid(colored(AnsiColor::Green).bold().underline())
    .placeholder(colored(AnsiColor::White))
}
