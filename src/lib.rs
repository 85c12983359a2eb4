//! projector: scaffold Python projects and drive their release cycle
//!
//! Every top-level command is a [`plugin::CommandPlugin`]; the
//! [`plugin::Dispatcher`] parses the command line against the combined
//! grammar and runs the matching handler.

pub mod checks;
pub mod commands;
pub mod core;
pub mod editors;
pub mod plugin;
pub mod release;
pub mod ui;
pub mod utils;

pub use crate::core::error::{ProjectorError, ProjectorResult};
