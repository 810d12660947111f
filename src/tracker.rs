//! Pluggable observability for every stage of a run: a `Tracker` trait
//! plus a no-op implementation and a combinator that fans events out to
//! more than one tracker at once.

use crate::dependency::{CheckResult, Dependency};
use crate::merger::MergeResult;
use crate::task::Task;

/// Tracks build events. Can be used to implement logging, event tracing,
/// and progress reporting.
pub trait Tracker {
  fn check_dependency_start(&mut self, task_name: &str, dependency: &Dependency);
  fn check_dependency_end(&mut self, task_name: &str, dependency: &Dependency, result: &CheckResult);

  fn execute_task_start(&mut self, task: &Task);
  fn execute_task_end(&mut self, task: &Task);
  fn up_to_date(&mut self, task_name: &str);

  fn regenerate_start(&mut self, generator_name: &str);
  fn regenerate_end(&mut self, generator_name: &str, result: &MergeResult);

  fn schedule_task(&mut self, task_name: &str);
  fn hit_task_limit(&mut self, max_tasks: usize);
}

/// A [`Tracker`] that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracker;

impl Tracker for NoopTracker {
  #[inline]
  fn check_dependency_start(&mut self, _task_name: &str, _dependency: &Dependency) {}
  #[inline]
  fn check_dependency_end(&mut self, _task_name: &str, _dependency: &Dependency, _result: &CheckResult) {}
  #[inline]
  fn execute_task_start(&mut self, _task: &Task) {}
  #[inline]
  fn execute_task_end(&mut self, _task: &Task) {}
  #[inline]
  fn up_to_date(&mut self, _task_name: &str) {}
  #[inline]
  fn regenerate_start(&mut self, _generator_name: &str) {}
  #[inline]
  fn regenerate_end(&mut self, _generator_name: &str, _result: &MergeResult) {}
  #[inline]
  fn schedule_task(&mut self, _task_name: &str) {}
  #[inline]
  fn hit_task_limit(&mut self, _max_tasks: usize) {}
}

/// A [`Tracker`] that forwards every event to two other [`Tracker`]s.
#[derive(Default, Clone, Debug)]
pub struct CompositeTracker<A1, A2>(pub A1, pub A2);

impl<T1: Tracker, T2: Tracker> Tracker for CompositeTracker<T1, T2> {
  #[inline]
  fn check_dependency_start(&mut self, task_name: &str, dependency: &Dependency) {
    self.0.check_dependency_start(task_name, dependency);
    self.1.check_dependency_start(task_name, dependency);
  }
  #[inline]
  fn check_dependency_end(&mut self, task_name: &str, dependency: &Dependency, result: &CheckResult) {
    self.0.check_dependency_end(task_name, dependency, result);
    self.1.check_dependency_end(task_name, dependency, result);
  }
  #[inline]
  fn execute_task_start(&mut self, task: &Task) {
    self.0.execute_task_start(task);
    self.1.execute_task_start(task);
  }
  #[inline]
  fn execute_task_end(&mut self, task: &Task) {
    self.0.execute_task_end(task);
    self.1.execute_task_end(task);
  }
  #[inline]
  fn up_to_date(&mut self, task_name: &str) {
    self.0.up_to_date(task_name);
    self.1.up_to_date(task_name);
  }
  #[inline]
  fn regenerate_start(&mut self, generator_name: &str) {
    self.0.regenerate_start(generator_name);
    self.1.regenerate_start(generator_name);
  }
  #[inline]
  fn regenerate_end(&mut self, generator_name: &str, result: &MergeResult) {
    self.0.regenerate_end(generator_name, result);
    self.1.regenerate_end(generator_name, result);
  }
  #[inline]
  fn schedule_task(&mut self, task_name: &str) {
    self.0.schedule_task(task_name);
    self.1.schedule_task(task_name);
  }
  #[inline]
  fn hit_task_limit(&mut self, max_tasks: usize) {
    self.0.hit_task_limit(max_tasks);
    self.1.hit_task_limit(max_tasks);
  }
}

/// Forwards every event to `tracing` spans/events rather than printing
/// directly; callers wire up a subscriber once at process entry
///. This is the default tracker outside of tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTracker;

impl Tracker for TracingTracker {
  fn check_dependency_start(&mut self, task_name: &str, dependency: &Dependency) {
    tracing::trace!(task = task_name, key = %dependency.key(), "checking dependency");
  }

  fn check_dependency_end(&mut self, task_name: &str, dependency: &Dependency, result: &CheckResult) {
    tracing::trace!(task = task_name, key = %dependency.key(), ?result, "dependency checked");
  }

  fn execute_task_start(&mut self, task: &Task) {
    tracing::info!(task = %task.name, "executing task");
  }

  fn execute_task_end(&mut self, task: &Task) {
    tracing::info!(task = %task.name, "task finished");
  }

  fn up_to_date(&mut self, task_name: &str) {
    tracing::debug!(task = task_name, "task up to date");
  }

  fn regenerate_start(&mut self, generator_name: &str) {
    tracing::debug!(generator = generator_name, "regenerating");
  }

  fn regenerate_end(&mut self, generator_name: &str, result: &MergeResult) {
    tracing::debug!(
      generator = generator_name,
      added = result.added.len(),
      updated = result.updated.len(),
      unchanged = result.unchanged.len(),
      "regeneration complete",
    );
  }

  fn schedule_task(&mut self, task_name: &str) {
    tracing::trace!(task = task_name, "scheduled");
  }

  fn hit_task_limit(&mut self, max_tasks: usize) {
    tracing::warn!(max_tasks, "hit max_tasks limit; run did not converge");
  }
}
