//! Versioned releases
//!
//! - **version_tag**: selectors (`1.2`, `minor`, `latest`, ...) and tag arithmetic
//! - **transaction**: snapshot and rollback around repository mutations
//! - **distribute**: building and uploading distributions
//! - **workflow**: the `version release` and `version upload` sequences

pub mod distribute;
pub mod transaction;
pub mod version_tag;
pub mod workflow;

pub use distribute::{BuildoutDistributions, DistributionBuilder};
pub use transaction::{RepositorySnapshot, run_transaction};
pub use version_tag::{VersionSelector, resolve_version_tag};
pub use workflow::{ReleaseOptions, ReleaseWorkflow, UploadOptions};
