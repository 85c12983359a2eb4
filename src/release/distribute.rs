//! Building and publishing distributions

use crate::core::build::{BuildParameters, BuildTool};
use crate::core::error::ProjectorResult;
use tracing::info;

/// Produces distributions of the checked-out revision and uploads them
pub trait DistributionBuilder {
  /// Regenerate `setup.py` for the checked-out revision
  fn prepare(&self) -> ProjectorResult<()>;

  /// Build `distribution` (e.g. `sdist`) and upload it to `index`
  fn build_and_upload(&self, distribution: &str, index: &str) -> ProjectorResult<()>;
}

/// Runs `setup.py` through the project's build tool
pub struct BuildoutDistributions<'a> {
  tool: BuildTool<'a>,
  params: BuildParameters,
}

impl<'a> BuildoutDistributions<'a> {
  pub fn new(tool: BuildTool<'a>) -> Self {
    Self {
      tool,
      params: BuildParameters::default(),
    }
  }
}

impl DistributionBuilder for BuildoutDistributions<'_> {
  fn prepare(&self) -> ProjectorResult<()> {
    self.tool.create_setup_py(&self.params)
  }

  fn build_and_upload(&self, distribution: &str, index: &str) -> ProjectorResult<()> {
    info!("Uploading {} to {}", distribution, index);
    self
      .tool
      .run(
        &self.params,
        &["setup", ".", "register", "-r", index, distribution, "upload", "-r", index],
      )
      .map(|_| ())
  }
}
