//! Target variants a task declares it produces, and the match strategy the
//! matching engine uses to resolve dependencies against them.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::dependency::normalize_directory_key;
use crate::fs_util::to_key_string;

/// Which index a target is registered in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchStrategy {
  Exact,
  Prefix,
  Custom,
}

/// A user-defined target kind, matched via a linear scan rather than an
/// index.
pub trait CustomTarget: fmt::Debug + dyn_clone::DynClone + Send + Sync {
  fn key(&self) -> String;
  fn matches(&self, dependency_key: &str) -> bool;
}
dyn_clone::clone_trait_object!(CustomTarget);

/// A typed declaration of a resource a task produces.
#[derive(Clone, Debug)]
pub enum Target {
  File { path: PathBuf },
  Object { bucket: String, key: String },
  Directory { key: String },
  ObjectPrefix { bucket: String, key: String },
  Custom(Box<dyn CustomTarget>),
}

impl Target {
  pub fn file(path: impl Into<PathBuf>) -> Self {
    Target::File { path: path.into() }
  }

  pub fn directory(path: impl AsRef<Path>) -> Self {
    Target::Directory { key: normalize_directory_key(&to_key_string(path)) }
  }

  pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
    Target::Object { bucket: bucket.into(), key: key.into() }
  }

  pub fn object_prefix(bucket: impl Into<String>, key: impl Into<String>) -> Self {
    let key = key.into();
    Target::ObjectPrefix { bucket: bucket.into(), key: normalize_directory_key(&key) }
  }

  pub fn key(&self) -> String {
    match self {
      Target::File { path } => to_key_string(path),
      Target::Object { bucket, key } => format!("s3://{bucket}/{key}"),
      Target::Directory { key } => key.clone(),
      Target::ObjectPrefix { bucket, key } => format!("s3://{bucket}/{key}"),
      Target::Custom(custom) => custom.key(),
    }
  }

  pub fn match_strategy(&self) -> MatchStrategy {
    match self {
      Target::File { .. } | Target::Object { .. } => MatchStrategy::Exact,
      Target::Directory { .. } | Target::ObjectPrefix { .. } => MatchStrategy::Prefix,
      Target::Custom(_) => MatchStrategy::Custom,
    }
  }

  /// Used only by the custom index's linear scan.
  pub fn matches(&self, dependency_key: &str) -> bool {
    match self {
      Target::Custom(custom) => custom.matches(dependency_key),
      other => other.key() == dependency_key,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn file_target_is_exact() {
    assert_eq!(Target::file("/out/a.txt").match_strategy(), MatchStrategy::Exact);
  }

  #[test]
  fn directory_target_is_prefix_and_normalized() {
    let target = Target::directory("/out");
    assert_eq!(target.match_strategy(), MatchStrategy::Prefix);
    assert_eq!(target.key(), "/out/");
  }
}
