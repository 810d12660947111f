//! Run configuration surface. No CLI binding lives here — parsing argv
//! is out of scope; embedders construct this programmatically.

use std::path::PathBuf;

/// Knobs the reactive engine and pattern expander need at construction.
#[derive(Clone, Debug)]
pub struct BuildConfig {
  /// Default base directory for inputs that don't specify their own.
  pub base_path: PathBuf,
  /// The reactive loop aborts with `hit_limit = true` once this many
  /// tasks have executed. Default matches the
  /// reactive engine this component is grounded on.
  pub max_tasks: usize,
}

impl BuildConfig {
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self { base_path: base_path.into(), max_tasks: Self::default().max_tasks }
  }

  pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
    self.max_tasks = max_tasks;
    self
  }
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self { base_path: PathBuf::from("."), max_tasks: 10_000 }
  }
}
