//! Diffs newly generated tasks against the existing set using input-key
//! hashes, invalidating completed-and-changed tasks.

use std::collections::{HashMap, HashSet};

use crate::task::Task;

/// The result of one `merge()` call.
#[derive(Default, Debug)]
pub struct MergeResult {
  pub added: Vec<String>,
  pub updated: Vec<String>,
  pub unchanged: Vec<String>,
}

impl MergeResult {
  pub fn has_changes(&self) -> bool {
    !self.added.is_empty() || !self.updated.is_empty()
  }

  /// `added ∪ updated`, in that order.
  pub fn all_new_tasks(&self) -> Vec<String> {
    self.added.iter().chain(self.updated.iter()).cloned().collect()
  }
}

/// Tracks `existing`, `input_hash`, and `completed` across regeneration
/// cycles.
#[derive(Default)]
pub struct TaskMerger {
  existing: HashMap<String, Task>,
  input_hashes: HashMap<String, HashSet<String>>,
  completed: HashSet<String>,
}

impl TaskMerger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Only dependency *identities* (keys) form the hash, never their
  /// contents — content-change detection is each dependency's own
  /// responsibility. This is the task-structure vs.
  /// task-input-data separation the merger exists to preserve.
  fn input_hash(task: &Task) -> HashSet<String> {
    task.dependencies.iter().map(|dep| dep.key()).collect()
  }

  pub fn merge(&mut self, new_tasks: Vec<Task>) -> MergeResult {
    let mut result = MergeResult::default();
    for task in new_tasks {
      let name = task.name.clone();
      let new_hash = Self::input_hash(&task);

      match self.input_hashes.get(&name) {
        None => {
          result.added.push(name.clone());
          self.input_hashes.insert(name.clone(), new_hash);
          self.existing.insert(name, task);
        }
        Some(old_hash) if *old_hash != new_hash => {
          result.updated.push(name.clone());
          self.completed.remove(&name);
          self.input_hashes.insert(name.clone(), new_hash);
          self.existing.insert(name, task);
        }
        Some(_) => {
          result.unchanged.push(name);
        }
      }
    }
    result
  }

  pub fn mark_completed(&mut self, name: &str) {
    self.completed.insert(name.to_string());
  }

  pub fn is_completed(&self, name: &str) -> bool {
    self.completed.contains(name)
  }

  pub fn get_task(&self, name: &str) -> Option<&Task> {
    self.existing.get(name)
  }

  pub fn get_task_mut(&mut self, name: &str) -> Option<&mut Task> {
    self.existing.get_mut(name)
  }

  pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
    self.existing.values()
  }

  pub fn task_names(&self) -> impl Iterator<Item = &str> {
    self.existing.keys().map(String::as_str)
  }

  pub fn total_tasks(&self) -> usize {
    self.existing.len()
  }

  pub fn completed_count(&self) -> usize {
    self.completed.len()
  }

  pub fn pending_count(&self) -> usize {
    self.existing.len() - self.completed.len()
  }

  pub fn clear(&mut self) {
    self.existing.clear();
    self.input_hashes.clear();
    self.completed.clear();
  }
}

#[cfg(test)]
mod test {
  use crate::dependency::Dependency;

  use super::*;

  fn task(name: &str, dep_keys: &[&str]) -> Task {
    Task::new(name).with_dependencies(dep_keys.iter().map(|k| Dependency::task_ordering(*k)).collect())
  }

  #[test]
  fn first_merge_adds_everything() {
    let mut merger = TaskMerger::new();
    let result = merger.merge(vec![task("a", &[]), task("b", &[])]);
    assert_eq!(result.added.len(), 2);
    assert!(result.updated.is_empty());
  }

  #[test]
  fn merge_is_idempotent() {
    let mut merger = TaskMerger::new();
    merger.merge(vec![task("a", &["x"])]);
    let result = merger.merge(vec![task("a", &["x"])]);
    assert!(result.added.is_empty());
    assert!(result.updated.is_empty());
    assert_eq!(result.unchanged, vec!["a".to_string()]);
  }

  #[test]
  fn completed_and_invalidated_on_input_hash_change() {
    let mut merger = TaskMerger::new();
    merger.merge(vec![task("a", &["x"])]);
    merger.mark_completed("a");
    assert!(merger.is_completed("a"));

    let result = merger.merge(vec![task("a", &["x", "y"])]);
    assert_eq!(result.updated, vec!["a".to_string()]);
    assert!(!merger.is_completed("a"));
  }

  #[test]
  fn unchanged_input_hash_keeps_completed_status() {
    let mut merger = TaskMerger::new();
    merger.merge(vec![task("a", &["x"])]);
    merger.mark_completed("a");
    merger.merge(vec![task("a", &["x"])]);
    assert!(merger.is_completed("a"));
  }
}
