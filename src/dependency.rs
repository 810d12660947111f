//! Dependency variants and the change-detection protocol every variant
//! implements.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs_util::to_key_string;
use crate::stamp::{CheckOutcome, FileChecker, FileState};

/// The outcome of checking a dependency against its previously stored
/// state, plus a short human-readable reason for diagnostics.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CheckResult {
  UpToDate,
  Changed { reason: &'static str },
  Missing { reason: &'static str },
}

/// A typed reference to an input resource with change-detection semantics.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Dependency {
  File { path: PathBuf, checker: FileChecker },
  ObjectStore { bucket: String, key: String },
  /// A happens-before edge on another task. `result_consuming` marks a
  /// `result_dep`: it additionally reports `Changed` whenever the
  /// referenced task actually executed in the current run.
  TaskOrdering { task_name: String, result_consuming: bool },
  /// Directory or object-store prefix; always reports `Changed`.
  DirectoryOrPrefix { key: String },
}

impl Dependency {
  pub fn file(path: impl Into<PathBuf>, checker: FileChecker) -> Self {
    Dependency::File { path: path.into(), checker }
  }

  pub fn task_ordering(task_name: impl Into<String>) -> Self {
    Dependency::TaskOrdering { task_name: task_name.into(), result_consuming: false }
  }

  pub fn result_dep(task_name: impl Into<String>) -> Self {
    Dependency::TaskOrdering { task_name: task_name.into(), result_consuming: true }
  }

  pub fn directory(path: impl AsRef<Path>) -> Self {
    Dependency::DirectoryOrPrefix { key: normalize_directory_key(&to_key_string(path)) }
  }

  pub fn object_prefix(bucket: impl AsRef<str>, key: impl AsRef<str>) -> Self {
    let uri = format!("s3://{}/{}", bucket.as_ref(), key.as_ref());
    Dependency::DirectoryOrPrefix { key: normalize_directory_key(&uri) }
  }

  /// The canonical resource key, the sole identity used across storage,
  /// matching, and merging.
  pub fn key(&self) -> String {
    match self {
      Dependency::File { path, .. } => to_key_string(path),
      Dependency::ObjectStore { bucket, key } => format!("s3://{bucket}/{key}"),
      Dependency::TaskOrdering { task_name, .. } => format!("task:{task_name}"),
      Dependency::DirectoryOrPrefix { key } => key.clone(),
    }
  }

  pub fn exists(&self) -> bool {
    match self {
      Dependency::File { path, .. } => path.exists(),
      Dependency::DirectoryOrPrefix { key } => Path::new(key).exists(),
      Dependency::TaskOrdering { .. } => true,
      Dependency::ObjectStore { .. } => true, // HEAD is out of scope here; callers use the object-store transport collaborator.
    }
  }

  /// Checks this dependency against its previously stored state.
  /// `task_executed_this_run` is consulted only for `result_dep`-flavored
  /// task-ordering dependencies.
  pub fn check(&self, previous: Option<&FileState>, task_executed_this_run: bool) -> Result<CheckResult> {
    match self {
      Dependency::File { path, checker } => match previous {
        None => Ok(CheckResult::Changed { reason: "no prior state (first run)" }),
        Some(previous) => match checker.check(path, previous)? {
          CheckOutcome::UpToDate => Ok(CheckResult::UpToDate),
          CheckOutcome::Changed => Ok(CheckResult::Changed { reason: "content or mtime changed" }),
          CheckOutcome::Missing => Ok(CheckResult::Missing { reason: "file no longer exists" }),
        },
      },
      Dependency::DirectoryOrPrefix { .. } => Ok(CheckResult::Changed { reason: "always triggers re-run" }),
      Dependency::TaskOrdering { result_consuming, .. } => {
        if *result_consuming && task_executed_this_run {
          Ok(CheckResult::Changed { reason: "upstream task result changed" })
        } else {
          Ok(CheckResult::UpToDate)
        }
      }
      Dependency::ObjectStore { .. } => match previous {
        None => Ok(CheckResult::Changed { reason: "no prior state (first run)" }),
        Some(_) => Ok(CheckResult::UpToDate), // etag comparison is owned by the object-store transport collaborator.
      },
    }
  }

  pub fn current_state(&self, previous: Option<&FileState>) -> Result<Option<FileState>> {
    match self {
      Dependency::File { path, checker } => Ok(Some(checker.current_state(path, previous)?)),
      _ => Ok(None),
    }
  }
}

/// Normalizes a directory/prefix key to end in exactly one `/`.
pub fn normalize_directory_key(key: &str) -> String {
  let trimmed = key.trim_end_matches('/');
  format!("{trimmed}/")
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn directory_key_is_normalized() {
    assert_eq!(Dependency::directory("/out").key(), "/out/");
    assert_eq!(Dependency::directory("/out/").key(), "/out/");
  }

  #[test]
  fn task_ordering_key_is_prefixed() {
    assert_eq!(Dependency::task_ordering("compile:main").key(), "task:compile:main");
  }

  #[test]
  fn task_ordering_always_up_to_date() {
    let dep = Dependency::task_ordering("compile:main");
    assert_eq!(dep.check(None, true).unwrap(), CheckResult::UpToDate);
  }

  #[test]
  fn result_dep_changed_iff_upstream_ran() {
    let dep = Dependency::result_dep("compile:main");
    assert_eq!(dep.check(None, false).unwrap(), CheckResult::UpToDate);
    assert_eq!(dep.check(None, true).unwrap(), CheckResult::Changed { reason: "upstream task result changed" });
  }

  #[test]
  fn directory_dependency_always_changed() {
    let dep = Dependency::directory("/out/");
    assert_eq!(dep.check(None, false).unwrap(), CheckResult::Changed { reason: "always triggers re-run" });
  }
}
