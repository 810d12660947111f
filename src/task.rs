//! The task record and its action. Action dispatch is resolved by the
//! variant tag at construction time rather than by runtime downcasting.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dependency::Dependency;
use crate::error::Result;
use crate::target::Target;

/// Data available to an action closure: the task's rendered attributes and
/// the resolved input/output paths (mirrors the `InputSet`/`output_paths`
/// pair the original action factory receives).
pub struct ActionContext {
  pub attrs: HashMap<String, String>,
  pub output_paths: Vec<String>,
}

/// One unit of work a task performs. Resolved at construction time by the
/// variant tag, never by downcasting a trait object.
#[derive(Clone)]
pub enum Action {
  /// An executable command string, left uninterpreted: shelling out is an
  /// external collaborator's job.
  Command(String),
  /// An in-process closure, shared via `Arc` so a task carrying one can
  /// still be cloned cheaply when the merger keeps an `existing` copy around.
  Closure(Arc<dyn Fn(&ActionContext) -> Result<()> + Send + Sync>),
  Sequence(Vec<Action>),
}

impl fmt::Debug for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Action::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
      Action::Closure(_) => f.write_str("Closure(..)"),
      Action::Sequence(actions) => f.debug_tuple("Sequence").field(actions).finish(),
    }
  }
}

impl Action {
  pub fn execute(&self, ctx: &ActionContext) -> Result<()> {
    match self {
      Action::Command(_) => Ok(()), // spawning is the executor collaborator's job; the core only records intent.
      Action::Closure(f) => f(ctx),
      Action::Sequence(actions) => {
        for action in actions {
          action.execute(ctx)?;
        }
        Ok(())
      }
    }
  }
}

/// A closure run after a successful action to populate one entry of the
/// task's `values` map.
pub type ValueSaver = Arc<dyn Fn(&ActionContext) -> String + Send + Sync>;

/// A unique, schedulable unit of work.
#[derive(Clone)]
pub struct Task {
  pub name: String,
  pub actions: Vec<Action>,
  pub dependencies: Vec<Dependency>,
  pub targets: Vec<Target>,
  pub doc: Option<String>,
  pub value_savers: HashMap<String, ValueSaver>,
  /// Populated after a successful run; read by downstream tasks that
  /// declared a `result_dep` on this task.
  pub values: HashMap<String, String>,
}

impl fmt::Debug for Task {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Task")
      .field("name", &self.name)
      .field("actions", &self.actions)
      .field("dependencies", &self.dependencies)
      .field("targets", &self.targets)
      .field("doc", &self.doc)
      .field("values", &self.values)
      .finish()
  }
}

impl Task {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      actions: Vec::new(),
      dependencies: Vec::new(),
      targets: Vec::new(),
      doc: None,
      value_savers: HashMap::new(),
      values: HashMap::new(),
    }
  }

  pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
    self.actions = actions;
    self
  }

  pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
    self.dependencies = dependencies;
    self
  }

  pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
    self.targets = targets;
    self
  }

  pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
    self.doc = Some(doc.into());
    self
  }

  /// A task's `task:<name>` wildcard deps expand against every currently
  /// known task name.
  pub fn has_wildcard_task_dependency(dep: &Dependency) -> Option<&str> {
    match dep {
      Dependency::TaskOrdering { task_name, .. } if task_name.contains('*') => Some(task_name.as_str()),
      _ => None,
    }
  }

  pub fn run_value_savers(&mut self, ctx: &ActionContext) {
    let mut new_values = HashMap::new();
    for (name, saver) in &self.value_savers {
      new_values.insert(name.clone(), saver(ctx));
    }
    self.values.extend(new_values);
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn wildcard_task_dependency_is_detected() {
    let dep = Dependency::task_ordering("compile:*");
    assert_eq!(Task::has_wildcard_task_dependency(&dep), Some("compile:*"));
    let dep = Dependency::task_ordering("compile:main");
    assert_eq!(Task::has_wildcard_task_dependency(&dep), None);
  }

  #[test]
  fn value_savers_populate_values() {
    let mut task = Task::new("t");
    task.value_savers.insert("count".to_string(), Arc::new(|_ctx: &ActionContext| "3".to_string()));
    let ctx = ActionContext { attrs: HashMap::new(), output_paths: Vec::new() };
    task.run_value_savers(&ctx);
    assert_eq!(task.values.get("count"), Some(&"3".to_string()));
  }
}
