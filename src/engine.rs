//! The reactive scheduler: initial expansion, graph construction, and the
//! streaming fixed-point loop that regenerates affected generators after
//! every task completion rather than in discrete waves.

use crate::config::BuildConfig;
use crate::error::Result;
use crate::executor::{Executor, TaskStatus};
use crate::generator::TaskGenerator;
use crate::index::OutputPatternIndex;
use crate::input::Input;
use crate::merger::TaskMerger;
use crate::store::StateStore;
use crate::target::Target;
use crate::task::Task;
use crate::tracker::Tracker;

/// A typed summary of one run: how many tasks executed, how many
/// generator regenerations happened, and whether the loop converged.
#[derive(Clone, Copy, Debug)]
pub struct ReactiveResult {
  pub tasks_executed: usize,
  pub total_tasks: usize,
  pub regenerations: usize,
  pub hit_limit: bool,
}

impl ReactiveResult {
  pub fn converged(&self) -> bool {
    !self.hit_limit
  }
}

/// Owns the generator set for one run. Constructed fresh per run (a
/// persisted `StateStore` is what carries information across runs, not this
/// struct) and consumed by `run`.
pub struct ReactiveEngine<A: Tracker> {
  generators: Vec<TaskGenerator>,
  config: BuildConfig,
  tracker: A,
}

impl<A: Tracker> ReactiveEngine<A> {
  pub fn new(generators: Vec<TaskGenerator>, config: BuildConfig, tracker: A) -> Self {
    Self { generators, config, tracker }
  }

  /// Runs initial expansion, graph construction, and the streaming loop to
  /// completion or until `max_tasks` is reached.
  pub fn run(mut self, store: &mut dyn StateStore) -> Result<ReactiveResult> {
    let mut merger = TaskMerger::new();
    let mut output_index = OutputPatternIndex::new();
    for generator in &self.generators {
      let prefixes: Vec<String> = generator.inputs.values().map(Input::static_prefix).collect();
      output_index.register_generator(&generator.name, &prefixes);
    }

    let mut regenerations = 0usize;
    for generator in &self.generators {
      self.tracker.regenerate_start(&generator.name);
      let tasks = generator.generate()?;
      let result = merger.merge(tasks);
      self.tracker.regenerate_end(&generator.name, &result);
      regenerations += 1;
    }

    let all_tasks: Vec<Task> = merger.all_tasks().cloned().collect();
    let mut executor = Executor::new(all_tasks, store, self.tracker)?;

    let mut tasks_executed = 0usize;
    let mut hit_limit = false;

    loop {
      if executor.is_exhausted() {
        break;
      }
      let mut ready = match executor.next_ready()? {
        Some(ready) => ready,
        // Every remaining pending task is permanently blocked; cannot
        // happen for a statically well-formed graph, but terminate rather than loop.
        None => break,
      };

      if tasks_executed >= self.config.max_tasks {
        executor.tracker_mut().hit_task_limit(self.config.max_tasks);
        hit_limit = true;
        break;
      }

      let should_run = ready.should_run;
      executor.execute_and_submit(&mut ready)?;
      if should_run {
        tasks_executed += 1;
      }

      if matches!(ready.status, TaskStatus::Succeeded | TaskStatus::UpToDate) {
        merger.mark_completed(&ready.name);
      }

      if matches!(ready.status, TaskStatus::Succeeded) {
        let output_keys: Vec<String> = ready.task.targets.iter().map(Target::key).collect();
        let affected = output_index.find_affected(&output_keys);
        for name in &affected {
          let generator = match self.generators.iter().find(|g| &g.name == name) {
            Some(generator) => generator,
            None => continue,
          };
          executor.tracker_mut().regenerate_start(&generator.name);
          let tasks = generator.generate()?;
          let merge_result = merger.merge(tasks);
          executor.tracker_mut().regenerate_end(&generator.name, &merge_result);
          regenerations += 1;

          for new_name in merge_result.all_new_tasks() {
            if let Some(task) = merger.get_task(&new_name).cloned() {
              executor.add_task(task)?;
            }
          }
        }
      }
    }

    let total_tasks = merger.total_tasks();
    executor.finish()?;

    Ok(ReactiveResult { tasks_executed, total_tasks, regenerations, hit_limit })
  }
}
