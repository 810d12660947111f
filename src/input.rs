//! Input patterns: resource discovery plus named-capture extraction.
//! Object-store input kinds are not implemented here: cloud-object-store
//! transport is out of scope; the `Dependency`/`Target` resource model
//! still carries an object-store variant for embedders that supply their
//! own transport.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::dependency::Dependency;
use crate::error::Result;
use crate::fs_util::to_key_string;
use crate::pattern::CompiledPattern;
use crate::stamp::FileChecker;

/// A single matched resource with its captured attributes.
#[derive(Clone, Debug)]
pub struct CaptureMatch {
  pub key: String,
  pub captures: Vec<(String, String)>,
  pub dependency: Dependency,
}

impl CaptureMatch {
  pub fn capture(&self, name: &str) -> Option<&str> {
    self.captures.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
  }
}

/// A labeled input pattern. `required` and `is_list` mirror
/// A labeled input pattern.
pub struct Input {
  pattern: CompiledPattern,
  pub required: bool,
  pub is_list: bool,
  kind: InputKind,
}

enum InputKind {
  File { base_path: PathBuf, checker: FileChecker },
  Directory { base_path: PathBuf },
}

impl Input {
  /// An input matching files under `base_path`. Every input carries an
  /// explicit base directory: there is no fallback
  /// to the process working directory.
  pub fn file(pattern: &str, base_path: impl Into<PathBuf>, checker: FileChecker) -> Result<Self> {
    let compiled = CompiledPattern::compile(pattern)?;
    let is_list = compiled.auto_is_list();
    Ok(Self { pattern: compiled, required: true, is_list, kind: InputKind::File { base_path: base_path.into(), checker } })
  }

  pub fn directory(pattern: &str, base_path: impl Into<PathBuf>) -> Result<Self> {
    let compiled = CompiledPattern::compile(pattern)?;
    Ok(Self { pattern: compiled, required: true, is_list: false, kind: InputKind::Directory { base_path: base_path.into() } })
  }

  pub fn optional(mut self) -> Self {
    self.required = false;
    self
  }

  pub fn capture_names(&self) -> &[String] {
    &self.pattern.capture_names
  }

  pub fn static_prefix(&self) -> String {
    let relative = self.pattern.static_prefix();
    match &self.kind {
      InputKind::File { base_path, .. } | InputKind::Directory { base_path } => {
        to_key_string(base_path.join(&relative))
      }
    }
  }

  /// Lists matching resources and extracts their captures.
  pub fn matches(&self) -> Result<Vec<CaptureMatch>> {
    match &self.kind {
      InputKind::File { base_path, checker } => self.match_files(base_path, *checker),
      InputKind::Directory { base_path } => self.match_directories(base_path),
    }
  }

  fn match_files(&self, base_path: &Path, checker: FileChecker) -> Result<Vec<CaptureMatch>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(base_path).into_iter().filter_map(|e| e.ok()) {
      if !entry.file_type().is_file() {
        continue;
      }
      let relative = match entry.path().strip_prefix(base_path) {
        Ok(relative) => to_key_string(relative),
        Err(_) => continue,
      };
      if let Some(captures) = self.pattern.match_key(&relative) {
        found.push(CaptureMatch {
          key: to_key_string(entry.path()),
          captures,
          dependency: Dependency::file(entry.path(), checker),
        });
      }
    }
    found.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(found)
  }

  fn match_directories(&self, base_path: &Path) -> Result<Vec<CaptureMatch>> {
    let mut found = Vec::new();
    let dir_pattern = self.pattern.glob.trim_end_matches('/');
    if !dir_pattern.contains('*') {
      let path = base_path.join(dir_pattern);
      if path.is_dir() {
        let relative = to_key_string(path.strip_prefix(base_path).unwrap_or(&path));
        if let Some(captures) = self.pattern.match_key(&relative) {
          found.push(CaptureMatch { key: to_key_string(&path), captures, dependency: Dependency::directory(&path) });
        }
      }
      return Ok(found);
    }
    for entry in WalkDir::new(base_path).min_depth(1).into_iter().filter_map(|e| e.ok()) {
      if !entry.file_type().is_dir() {
        continue;
      }
      let relative = match entry.path().strip_prefix(base_path) {
        Ok(relative) => to_key_string(relative),
        Err(_) => continue,
      };
      if let Some(captures) = self.pattern.match_key(&relative) {
        found.push(CaptureMatch { key: to_key_string(entry.path()), captures, dependency: Dependency::directory(entry.path()) });
      }
    }
    found.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(found)
  }
}
