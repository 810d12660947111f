//! Assembles a task set into a graph: registers every target with the
//! matching engine, derives implicit task-ordering edges from
//! dependency->producer resolution, and expands wildcard task dependencies
//! against the known task-name set.

use std::collections::HashMap;

use regex::Regex;

use crate::dependency::Dependency;
use crate::error::{BuildError, Result};
use crate::matching::MatchingEngine;
use crate::task::Task;

/// The assembled task graph: every task keyed by name, plus the matching
/// engine built from their targets.
pub struct TaskRegistry {
  tasks: HashMap<String, Task>,
  matching: MatchingEngine,
}

impl TaskRegistry {
  /// Builds a registry from a flat task list, performing three steps in
  /// order: register targets, derive implicit dependencies, expand
  /// wildcard task dependencies.
  pub fn build(tasks: Vec<Task>) -> Result<Self> {
    let mut matching = MatchingEngine::new();
    for task in &tasks {
      for target in &task.targets {
        matching.register_target(target, &task.name)?;
      }
    }

    let mut by_name: HashMap<String, Task> = tasks.into_iter().map(|t| (t.name.clone(), t)).collect();
    derive_implicit_dependencies(&mut by_name, &matching)?;
    expand_wildcard_dependencies(&mut by_name)?;

    Ok(Self { tasks: by_name, matching })
  }

  pub fn get(&self, name: &str) -> Option<&Task> {
    self.tasks.get(name)
  }

  pub fn get_mut(&mut self, name: &str) -> Option<&mut Task> {
    self.tasks.get_mut(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.tasks.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.tasks.keys().map(String::as_str)
  }

  pub fn into_tasks(self) -> Vec<Task> {
    self.tasks.into_values().collect()
  }

  pub fn matching(&self) -> &MatchingEngine {
    &self.matching
  }

  pub fn matching_mut(&mut self) -> &mut MatchingEngine {
    &mut self.matching
  }

  /// Registers one more task's targets and folds it into the graph,
  /// deriving implicit dependencies and wildcard expansions for the newly
  /// inserted task only. Previously inserted tasks' dependency lists are
  /// never revisited, so a wildcard dependency expanded against an earlier
  /// name snapshot does not retroactively gain edges to tasks injected
  /// afterward.
  pub fn insert(&mut self, task: Task) -> Result<()> {
    for target in &task.targets {
      self.matching.register_target(target, &task.name)?;
    }
    let name = task.name.clone();
    self.tasks.insert(name.clone(), task);
    derive_implicit_dependencies_for(&mut self.tasks, &self.matching, &name)?;
    let known_names: Vec<String> = self.tasks.keys().cloned().collect();
    expand_wildcard_dependencies_for(&mut self.tasks, &known_names, &name)?;
    Ok(())
  }
}

/// Step 2: for every dependency of every task, resolve a producer and add an
/// implicit task-ordering edge if one isn't already present. Idempotent.
fn derive_implicit_dependencies(by_name: &mut HashMap<String, Task>, matching: &MatchingEngine) -> Result<()> {
  let names: Vec<String> = by_name.keys().cloned().collect();
  for name in names {
    derive_implicit_dependencies_for(by_name, matching, &name)?;
  }
  Ok(())
}

/// Resolves producers for one task's own dependencies and adds implicit
/// task-ordering edges. Touches only `name`'s dependency list.
fn derive_implicit_dependencies_for(by_name: &mut HashMap<String, Task>, matching: &MatchingEngine, name: &str) -> Result<()> {
  let existing = by_name[name].dependencies.clone();
  let mut to_add = Vec::new();
  for dep in &existing {
    if let Some(producer) = matching.find_producer(&dep.key()) {
      if producer == name {
        continue;
      }
      let edge = Dependency::task_ordering(producer);
      if !existing.contains(&edge) && !to_add.contains(&edge) {
        to_add.push(edge);
      }
    }
  }
  if !to_add.is_empty() {
    by_name.get_mut(name).expect("name came from by_name.keys()").dependencies.extend(to_add);
  }
  Ok(())
}

/// Step 3: expand every wildcard task-ordering dependency against the
/// currently-known task name set.
fn expand_wildcard_dependencies(by_name: &mut HashMap<String, Task>) -> Result<()> {
  let known_names: Vec<String> = by_name.keys().cloned().collect();
  for name in known_names.clone() {
    expand_wildcard_dependencies_for(by_name, &known_names, &name)?;
  }
  Ok(())
}

/// Expands one task's own wildcard task-ordering dependencies against
/// `known_names`. Touches only `name`'s dependency list, so a task's
/// wildcard never retroactively gains edges to names added to `by_name`
/// after this call.
fn expand_wildcard_dependencies_for(by_name: &mut HashMap<String, Task>, known_names: &[String], name: &str) -> Result<()> {
  let existing = by_name[name].dependencies.clone();
  let mut to_add = Vec::new();
  for dep in &existing {
    if let Some(glob_pattern) = Task::has_wildcard_task_dependency(dep) {
      let regex = glob_to_regex(glob_pattern)?;
      for candidate in known_names {
        if candidate == name || !regex.is_match(candidate) {
          continue;
        }
        let edge = Dependency::task_ordering(candidate.clone());
        if !existing.contains(&edge) && !to_add.contains(&edge) {
          to_add.push(edge);
        }
      }
    }
  }
  if !to_add.is_empty() {
    by_name.get_mut(name).expect("name came from by_name.keys()").dependencies.extend(to_add);
  }
  Ok(())
}

/// Compiles a task-name glob (`*` only, no `<name>` captures: task names are
/// opaque strings, not filesystem paths) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
  let escaped = pattern.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
  let source = format!("^{escaped}$");
  Regex::new(&source).map_err(|e| BuildError::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() })
}
