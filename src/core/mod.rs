//! Core building blocks shared by every command
//!
//! - **build**: the build tool, its parameters and the environment build step
//! - **config**: typed access to `buildout.toml`
//! - **context**: project root and collaborators handed to every handler
//! - **error**: error taxonomy with exit codes and help messages
//! - **process**: running external programs behind a mockable runner
//! - **vcs**: git operations (SystemGit)

pub mod build;
pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod vcs;
