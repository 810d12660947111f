//! The single-threaded in-process executor: constructed with a task set
//! and a store, yields ready-task wrappers in dependency order, and
//! accepts tasks injected mid-iteration.

use std::collections::{HashSet, VecDeque};

use crate::dependency::{CheckResult, Dependency};
use crate::error::Result;
use crate::registry::TaskRegistry;
use crate::store::StateStore;
use crate::target::Target;
use crate::task::{Action, ActionContext, Task};
use crate::tracker::Tracker;

/// The outcome of running (or not running) a ready task.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TaskStatus {
  Pending,
  UpToDate,
  Succeeded,
  Failed,
  /// Skipped because a declared or implicit ordering dependency failed.
  Skipped,
}

/// The per-task object yielded by the executor's ready stream: conveys both
/// the task and its up-to-date decision.
pub struct ReadyTask {
  pub name: String,
  pub task: Task,
  pub should_run: bool,
  pub status: TaskStatus,
}

/// Drives one streaming run: pops tasks whose ordering dependencies are
/// already resolved, in FIFO-among-ready order, and accepts `add_task`
/// injections from within the iteration body.
pub struct Executor<'s, A: Tracker> {
  registry: TaskRegistry,
  store: &'s mut dyn StateStore,
  tracker: A,
  pending: VecDeque<String>,
  resolved: HashSet<String>,
  failed: HashSet<String>,
  executed_this_run: HashSet<String>,
}

impl<'s, A: Tracker> Executor<'s, A> {
  pub fn new(tasks: Vec<Task>, store: &'s mut dyn StateStore, tracker: A) -> Result<Self> {
    let registry = TaskRegistry::build(tasks)?;
    let pending: VecDeque<String> = registry.names().map(str::to_string).collect();
    Ok(Self {
      registry,
      store,
      tracker,
      pending,
      resolved: HashSet::new(),
      failed: HashSet::new(),
      executed_this_run: HashSet::new(),
    })
  }

  /// Injects a task, safe to call from the iteration body.
  /// Re-derives implicit dependencies and wildcard expansions over the
  /// updated graph and enqueues the new task for consideration.
  pub fn add_task(&mut self, task: Task) -> Result<()> {
    let name = task.name.clone();
    self.registry.insert(task)?;
    if !self.pending.contains(&name) {
      self.pending.push_back(name);
    }
    Ok(())
  }

  /// Pops and returns the next task whose declared and implicit ordering
  /// dependencies are all resolved (succeeded, up-to-date, failed, or
  /// skipped), or `None` if the stream is exhausted for now (every
  /// remaining pending task still waits on an unresolved dependency).
  pub fn next_ready(&mut self) -> Result<Option<ReadyTask>> {
    let mut deferred = VecDeque::new();
    let mut result = None;

    while let Some(name) = self.pending.pop_front() {
      let task = match self.registry.get(&name) {
        Some(task) => task.clone(),
        None => continue, // removed by a later merge; nothing to schedule.
      };

      if !self.all_dependencies_resolved(&task) {
        deferred.push_back(name);
        continue;
      }

      if self.any_dependency_failed(&task) {
        self.tracker.schedule_task(&name);
        self.failed.insert(name.clone());
        self.resolved.insert(name.clone());
        result = Some(ReadyTask { name, task, should_run: false, status: TaskStatus::Skipped });
        break;
      }

      let should_run = self.compute_should_run(&task)?;
      result = Some(ReadyTask { name, task, should_run, status: TaskStatus::Pending });
      break;
    }

    while let Some(name) = deferred.pop_back() {
      self.pending.push_front(name);
    }
    Ok(result)
  }

  fn all_dependencies_resolved(&self, task: &Task) -> bool {
    task.dependencies.iter().all(|dep| match dep {
      Dependency::TaskOrdering { task_name, .. } => self.resolved.contains(task_name),
      _ => true,
    })
  }

  fn any_dependency_failed(&self, task: &Task) -> bool {
    task.dependencies.iter().any(|dep| match dep {
      Dependency::TaskOrdering { task_name, .. } => self.failed.contains(task_name),
      _ => false,
    })
  }

  /// Up-to-date iff every dependency checks UP_TO_DATE and every target
  /// exists. A task with no dependencies has no criterion by which it
  /// could be judged up-to-date, so it always runs.
  fn compute_should_run(&mut self, task: &Task) -> Result<bool> {
    if task.dependencies.is_empty() {
      return Ok(true);
    }

    let mut all_up_to_date = true;
    for dep in &task.dependencies {
      if !matches!(dep, Dependency::TaskOrdering { .. })
        && !dep.exists()
        && self.registry.matching().find_producer(&dep.key()).is_none()
      {
        return Err(crate::error::BuildError::InputMissing { key: dep.key() });
      }

      let previous = self.store.get(&task.name, &dep.key());
      let producer_executed = match dep {
        Dependency::TaskOrdering { task_name, .. } => self.executed_this_run.contains(task_name),
        _ => false,
      };

      self.tracker.check_dependency_start(&task.name, dep);
      let result = dep.check(previous.as_ref(), producer_executed)?;
      self.tracker.check_dependency_end(&task.name, dep, &result);
      if result != CheckResult::UpToDate {
        all_up_to_date = false;
      }
    }

    let all_targets_exist = task.targets.iter().all(target_exists);
    Ok(!all_up_to_date || !all_targets_exist)
  }

  /// Runs `ready`'s action (if `should_run`), persists updated dependency
  /// states and value-saver results on success, and marks the task resolved.
  pub fn execute_and_submit(&mut self, ready: &mut ReadyTask) -> Result<()> {
    if !ready.should_run {
      self.tracker.up_to_date(&ready.name);
      ready.status = TaskStatus::UpToDate;
      self.resolved.insert(ready.name.clone());
      return Ok(());
    }

    self.tracker.execute_task_start(&ready.task);
    let ctx = ActionContext {
      attrs: Default::default(),
      output_paths: ready.task.targets.iter().map(Target::key).collect(),
    };

    let outcome = ready.task.actions.iter().try_for_each(|action: &Action| action.execute(&ctx));
    self.tracker.execute_task_end(&ready.task);

    match outcome {
      Ok(()) => {
        for dep in &ready.task.dependencies {
          let previous = self.store.get(&ready.name, &dep.key());
          if let Some(state) = dep.current_state(previous.as_ref())? {
            self.store.put(&ready.name, &dep.key(), state);
          }
        }
        ready.task.run_value_savers(&ctx);
        if !ready.task.values.is_empty() {
          let mut entries: Vec<(&String, &String)> = ready.task.values.iter().collect();
          entries.sort_by_key(|(k, _)| k.as_str());
          let encoded = entries.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(";");
          self.store.put_result(&ready.name, encoded);
        }
        self.executed_this_run.insert(ready.name.clone());
        ready.status = TaskStatus::Succeeded;
      }
      Err(e) => {
        ready.status = TaskStatus::Failed;
        self.failed.insert(ready.name.clone());
        self.resolved.insert(ready.name.clone());
        return Err(e);
      }
    }
    self.resolved.insert(ready.name.clone());
    Ok(())
  }

  pub fn is_exhausted(&self) -> bool {
    self.pending.is_empty()
  }

  /// Lets a caller outside this module (the reactive engine) emit
  /// regeneration-lifecycle events through the same tracker task execution
  /// events go through, without the engine owning a second tracker handle.
  pub fn tracker_mut(&mut self) -> &mut A {
    &mut self.tracker
  }

  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  /// Releases the store by committing it.
  pub fn finish(self) -> Result<()> {
    self.store.commit()
  }
}

impl<'s, A: Tracker> Drop for Executor<'s, A> {
  fn drop(&mut self) {
    let _ = self.store.commit();
  }
}

fn target_exists(target: &Target) -> bool {
  match target {
    Target::File { path } => path.exists(),
    Target::Directory { key } => std::path::Path::new(key).exists(),
    Target::Object { .. } | Target::ObjectPrefix { .. } => true,
    Target::Custom(_) => true,
  }
}
