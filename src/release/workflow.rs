//! Release and upload sequences
//!
//! ```text
//! release: resolve -> fetch -> tag is new -> stable merged -> not behind remote
//!          -> [checkout stable, merge --no-ff, tag, checkout integration, merge back]
//!          -> push -> upload | checkout integration
//! upload:  resolve target -> (checkout, setup.py, build and upload) per distribution x index
//!          -> checkout integration
//! ```
//!
//! The bracketed steps run inside a rollback transaction. Uploads are not
//! rolled back.

use super::distribute::DistributionBuilder;
use super::transaction::run_transaction;
use super::version_tag::{VersionSelector, latest_release_tag, resolve_version_tag, tag_name};
use crate::core::error::{DivergenceError, ProjectorResult, VersionError};
use crate::core::vcs::{BranchLayout, Vcs};
use crate::ui::progress::UploadProgress;
use tracing::{debug, info};

pub const DEFAULT_DISTRIBUTIONS: &[&str] = &["sdist", "bdist_egg"];
pub const DEFAULT_INDEXES: &[&str] = &["pypi"];

/// What to build and where to publish it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
  pub distributions: Vec<String>,
  /// Package index names as known to the build tool's upload command
  pub indexes: Vec<String>,
}

impl Default for UploadOptions {
  fn default() -> Self {
    Self {
      distributions: DEFAULT_DISTRIBUTIONS.iter().map(|d| d.to_string()).collect(),
      indexes: DEFAULT_INDEXES.iter().map(|i| i.to_string()).collect(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
  pub no_fetch: bool,
  pub no_upload: bool,
  pub no_push_changes: bool,
  pub keep_leftovers: bool,
  pub upload: UploadOptions,
}

pub struct ReleaseWorkflow<'a> {
  vcs: &'a dyn Vcs,
  layout: &'a BranchLayout,
  builder: &'a dyn DistributionBuilder,
  show_progress: bool,
}

impl<'a> ReleaseWorkflow<'a> {
  pub fn new(vcs: &'a dyn Vcs, layout: &'a BranchLayout, builder: &'a dyn DistributionBuilder) -> Self {
    Self {
      vcs,
      layout,
      builder,
      show_progress: true,
    }
  }

  /// Skip drawing the upload progress bar
  pub fn quiet(mut self) -> Self {
    self.show_progress = false;
    self
  }

  /// Release the version `selector` names; returns the created tag
  pub fn release(&self, selector: &VersionSelector, options: &ReleaseOptions) -> ProjectorResult<String> {
    let describe = match selector {
      VersionSelector::Increment(_) => self.vcs.describe()?,
      _ => String::new(),
    };
    let version = resolve_version_tag(selector, &describe)?;
    let tag = tag_name(&version);

    if !options.no_fetch {
      self.fetch()?;
    }
    if self.vcs.tags()?.contains(&tag) {
      return Err(VersionError::AlreadyReleased { tag }.into());
    }
    self.assert_stable_merged()?;
    self.assert_not_behind_remote()?;

    info!("Releasing {}", tag);
    run_transaction(self.vcs, self.layout, options.keep_leftovers, || self.merge_and_tag(&tag))?;

    if !options.no_push_changes {
      info!("Pushing changes to {}", self.layout.remote);
      self.vcs.push_branches(&self.layout.remote)?;
      self.vcs.push_tags(&self.layout.remote)?;
    }

    if options.no_upload {
      self.vcs.checkout(&self.layout.integration)?;
    } else {
      self.upload(&VersionSelector::Literal(tag.clone()), &options.upload)?;
    }
    Ok(tag)
  }

  /// Build and upload the revision `selector` names; returns the uploaded revision
  pub fn upload(&self, selector: &VersionSelector, options: &UploadOptions) -> ProjectorResult<String> {
    let target = self.upload_target(selector)?;
    let total = options.distributions.len() * options.indexes.len();
    let mut progress = self.show_progress.then(|| UploadProgress::new(total, &target));

    for distribution in &options.distributions {
      for index in &options.indexes {
        self.vcs.checkout(&target)?;
        self.builder.prepare()?;
        self.builder.build_and_upload(distribution, index)?;
        if let Some(progress) = progress.as_mut() {
          progress.inc();
        }
      }
    }
    self.vcs.checkout(&self.layout.integration)?;
    Ok(target)
  }

  fn upload_target(&self, selector: &VersionSelector) -> ProjectorResult<String> {
    match selector {
      VersionSelector::Current => Ok("HEAD".to_string()),
      VersionSelector::Latest => latest_release_tag(&self.vcs.tags()?, &self.layout.integration_tag_suffix())
        .ok_or_else(|| VersionError::NoReleases.into()),
      other => {
        let tag = tag_name(other.as_str());
        if !self.vcs.tags()?.contains(&tag) {
          return Err(VersionError::NotReleased { tag }.into());
        }
        Ok(tag)
      }
    }
  }

  fn fetch(&self) -> ProjectorResult<()> {
    debug!("Fetching {}", self.layout.remote);
    self.vcs.fetch(&self.layout.remote).map_err(|err| {
      DivergenceError::FetchFailed {
        remote: self.layout.remote.clone(),
        reason: err.to_string(),
      }
      .into()
    })
  }

  fn assert_stable_merged(&self) -> ProjectorResult<()> {
    if self.vcs.is_ancestor(&self.layout.stable, &self.layout.integration)? {
      return Ok(());
    }
    Err(
      DivergenceError::StableNotMerged {
        stable: self.layout.stable.clone(),
        integration: self.layout.integration.clone(),
      }
      .into(),
    )
  }

  fn assert_not_behind_remote(&self) -> ProjectorResult<()> {
    for branch in self.layout.long_lived() {
      let Some(upstream) = self.vcs.upstream(branch)? else {
        continue;
      };
      if !self.vcs.is_ancestor(&upstream, branch)? {
        return Err(
          DivergenceError::BehindRemote {
            branch: branch.to_string(),
            upstream,
          }
          .into(),
        );
      }
    }
    Ok(())
  }

  fn merge_and_tag(&self, tag: &str) -> ProjectorResult<()> {
    let layout = self.layout;
    self.vcs.checkout(&layout.stable)?;
    let message = format!("Finished release {}", tag);
    self.vcs.merge(&layout.integration, true, Some(&message))?;
    self.vcs.create_tag(tag, tag)?;
    self.vcs.checkout(&layout.integration)?;
    self.vcs.merge(&layout.stable, false, None)
  }
}
