//! Package-set editors
//!
//! The `requirements`, `console-scripts`, `package-data` and
//! `js-requirements` commands all edit one collection stored in
//! `buildout.toml`. [`ListSet`] and [`EntryPointSet`] implement list, add and
//! remove once; [`changes`] commits or pushes the result on request.

pub mod changes;
pub mod package_set;

pub use changes::{commit_config_changes, finish_config_change};
pub use package_set::{EntryPointSet, ListSet};
