//! Exact/Prefix/Custom producer indexes, composed behind one interface.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{BuildError, Result};
use crate::target::{MatchStrategy, Target};
use crate::trie::PrefixTrie;

#[derive(Default)]
struct ExactIndex {
  by_key: HashMap<String, String>,
}

impl ExactIndex {
  fn register(&mut self, key: String, task_name: String) -> Result<()> {
    if let Some(existing_owner) = self.by_key.get(&key) {
      return Err(BuildError::DuplicateTarget { key, existing_owner: existing_owner.clone(), new_owner: task_name });
    }
    self.by_key.insert(key, task_name);
    Ok(())
  }

  fn find(&self, key: &str) -> Option<&str> {
    self.by_key.get(key).map(String::as_str)
  }
}

#[derive(Default)]
struct PrefixIndex {
  trie: PrefixTrie<String>,
  registered: HashMap<String, String>,
}

impl PrefixIndex {
  fn register(&mut self, prefix: String, task_name: String) -> Result<()> {
    if let Some(existing_owner) = self.registered.get(&prefix) {
      return Err(BuildError::DuplicateTarget { key: prefix, existing_owner: existing_owner.clone(), new_owner: task_name });
    }
    self.trie.insert(&prefix, task_name.clone());
    self.registered.insert(prefix, task_name);
    Ok(())
  }

  fn find(&self, key: &str) -> Option<&str> {
    self.trie.longest_prefix(key).map(String::as_str)
  }
}

#[derive(Default)]
struct CustomIndex {
  entries: Vec<(Target, String)>,
}

impl CustomIndex {
  fn register(&mut self, target: Target, task_name: String) {
    self.entries.push((target, task_name));
  }

  fn find(&self, dependency_key: &str) -> Option<&str> {
    self.entries.iter().find(|(target, _)| target.matches(dependency_key)).map(|(_, name)| name.as_str())
  }

  fn find_all<'a>(&'a self, dependency_key: &str) -> Vec<&'a str> {
    self.entries.iter().filter(|(target, _)| target.matches(dependency_key)).map(|(_, name)| name.as_str()).collect()
  }
}

/// Maps any dependency key to the task that produces a matching target,
/// trying exact, then longest-prefix, then custom matches in that order.
#[derive(Default)]
pub struct MatchingEngine {
  exact: ExactIndex,
  prefix: PrefixIndex,
  custom: CustomIndex,
  cache: RefCell<HashMap<String, Option<String>>>,
}

impl MatchingEngine {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `target` as produced by `task_name`. Clears the resolution
  /// cache: registration is a static graph-build-time phase, so this is rare.
  pub fn register_target(&mut self, target: &Target, task_name: &str) -> Result<()> {
    match target.match_strategy() {
      MatchStrategy::Exact => self.exact.register(target.key(), task_name.to_string())?,
      MatchStrategy::Prefix => self.prefix.register(target.key(), task_name.to_string())?,
      MatchStrategy::Custom => self.custom.register(target.clone(), task_name.to_string()),
    }
    self.cache.borrow_mut().clear();
    Ok(())
  }

  /// Resolution order: exact -> longest prefix -> custom linear scan.
  /// First non-null wins; cached by dependency key.
  pub fn find_producer(&self, dependency_key: &str) -> Option<String> {
    if let Some(cached) = self.cache.borrow().get(dependency_key) {
      return cached.clone();
    }
    let found = self.exact.find(dependency_key)
      .or_else(|| self.prefix.find(dependency_key))
      .or_else(|| self.custom.find(dependency_key))
      .map(str::to_string);
    self.cache.borrow_mut().insert(dependency_key.to_string(), found.clone());
    found
  }

  /// Unions all three indexes without the priority rule or caching; used
  /// for diagnostics and the duplicate-conflict check.
  pub fn find_all_producers(&self, dependency_key: &str) -> Vec<String> {
    let mut found = Vec::new();
    if let Some(owner) = self.exact.find(dependency_key) {
      found.push(owner.to_string());
    }
    if let Some(owner) = self.prefix.find(dependency_key) {
      found.push(owner.to_string());
    }
    found.extend(self.custom.find_all(dependency_key).into_iter().map(str::to_string));
    found
  }

  pub fn exact_count(&self) -> usize {
    self.exact.by_key.len()
  }

  pub fn prefix_count(&self) -> usize {
    self.prefix.registered.len()
  }

  pub fn custom_count(&self) -> usize {
    self.custom.entries.len()
  }

  pub fn total_count(&self) -> usize {
    self.exact_count() + self.prefix_count() + self.custom_count()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn exact_beats_prefix() {
    let mut engine = MatchingEngine::new();
    engine.register_target(&Target::directory("/output/"), "D").unwrap();
    engine.register_target(&Target::file("/output/special.txt"), "F").unwrap();
    assert_eq!(engine.find_producer("/output/special.txt"), Some("F".to_string()));
    assert_eq!(engine.find_producer("/output/other.txt"), Some("D".to_string()));
  }

  #[test]
  fn duplicate_exact_target_is_an_error() {
    let mut engine = MatchingEngine::new();
    engine.register_target(&Target::file("/a.txt"), "T1").unwrap();
    let err = engine.register_target(&Target::file("/a.txt"), "T2").unwrap_err();
    assert!(matches!(err, BuildError::DuplicateTarget { .. }));
  }

  #[test]
  fn duplicate_prefix_target_is_an_error() {
    let mut engine = MatchingEngine::new();
    engine.register_target(&Target::directory("/out/"), "T1").unwrap();
    let err = engine.register_target(&Target::directory("/out/"), "T2").unwrap_err();
    assert!(matches!(err, BuildError::DuplicateTarget { .. }));
  }

  #[test]
  fn no_producer_returns_none() {
    let engine = MatchingEngine::new();
    assert_eq!(engine.find_producer("/nope.txt"), None);
  }

  #[test]
  fn registration_clears_cache() {
    let mut engine = MatchingEngine::new();
    assert_eq!(engine.find_producer("/a.txt"), None);
    engine.register_target(&Target::file("/a.txt"), "T1").unwrap();
    assert_eq!(engine.find_producer("/a.txt"), Some("T1".to_string()));
  }
}
