//! Progress indicators for long-running operations
//!
//! Uses `linya` for allocation-free progress bars drawn on stderr.

use linya::{Bar, Progress};

/// One bar counting distribution uploads
pub struct UploadProgress {
  progress: Progress,
  bar: Bar,
}

impl UploadProgress {
  /// Bar for `total` uploads of `tag`
  pub fn new(total: usize, tag: &str) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, format!("Uploading {}", tag));
    Self { progress, bar }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
