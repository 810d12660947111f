//! Diamond recompute through the single-threaded executor, and the
//! reactive streaming cascade through the full `ReactiveEngine`.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use rebuild::dependency::Dependency;
use rebuild::executor::{Executor, TaskStatus};
use rebuild::generator::TaskGenerator;
use rebuild::input::Input;
use rebuild::output::Output;
use rebuild::stamp::FileChecker;
use rebuild::store::MemoryStore;
use rebuild::target::Target;
use rebuild::tracker::NoopTracker;
use rebuild::{Action, BuildConfig, ReactiveEngine, Task};

use common::{temp_dir, write_file};

fn diamond_tasks(seed: &std::path::Path, a: &std::path::Path, b: &std::path::Path, c: &std::path::Path, d: &std::path::Path) -> Vec<Task> {
  let task_a = Task::new("A")
    .with_dependencies(vec![Dependency::file(seed, FileChecker::Mtime)])
    .with_targets(vec![Target::file(a)])
    .with_actions(vec![copy_action(seed, a)]);
  let task_b = Task::new("B")
    .with_dependencies(vec![Dependency::file(a, FileChecker::Mtime)])
    .with_targets(vec![Target::file(b)])
    .with_actions(vec![copy_action(a, b)]);
  let task_c = Task::new("C")
    .with_dependencies(vec![Dependency::file(a, FileChecker::Mtime)])
    .with_targets(vec![Target::file(c)])
    .with_actions(vec![copy_action(a, c)]);
  let task_d = Task::new("D")
    .with_dependencies(vec![Dependency::file(b, FileChecker::Mtime), Dependency::file(c, FileChecker::Mtime)])
    .with_targets(vec![Target::file(d)])
    .with_actions(vec![]);
  vec![task_a, task_b, task_c, task_d]
}

fn copy_action(from: &std::path::Path, to: &std::path::Path) -> Action {
  let from = from.to_path_buf();
  let to = to.to_path_buf();
  Action::Closure(Arc::new(move |_ctx| {
    let contents = std::fs::read_to_string(&from).map_err(|source| rebuild::BuildError::Io { path: from.clone(), source })?;
    std::fs::write(&to, contents).map_err(|source| rebuild::BuildError::Io { path: to.clone(), source })?;
    Ok(())
  }))
}

fn run_to_completion(tasks: Vec<Task>, store: &mut MemoryStore) -> HashMap<String, TaskStatus> {
  let mut executor = Executor::new(tasks, store, NoopTracker).unwrap();
  let mut statuses = HashMap::new();
  while !executor.is_exhausted() {
    let mut ready = match executor.next_ready().unwrap() {
      Some(ready) => ready,
      None => break,
    };
    executor.execute_and_submit(&mut ready).unwrap();
    statuses.insert(ready.name, ready.status);
  }
  executor.finish().unwrap();
  statuses
}

#[test]
fn scenario_3_diamond_recompute() {
  let dir = temp_dir();
  let seed = dir.path().join("seed.txt");
  let a = dir.path().join("a.txt");
  let b = dir.path().join("b.txt");
  let c = dir.path().join("c.txt");
  let d = dir.path().join("d.txt");
  write_file(&seed, "v1");

  let mut store = MemoryStore::new();

  let first = run_to_completion(diamond_tasks(&seed, &a, &b, &c, &d), &mut store);
  assert_eq!(first["A"], TaskStatus::Succeeded);
  assert_eq!(first["B"], TaskStatus::Succeeded);
  assert_eq!(first["C"], TaskStatus::Succeeded);
  assert_eq!(first["D"], TaskStatus::Succeeded);

  // Second run, nothing touched: everything is up to date.
  let second = run_to_completion(diamond_tasks(&seed, &a, &b, &c, &d), &mut store);
  assert_eq!(second["A"], TaskStatus::UpToDate);
  assert_eq!(second["B"], TaskStatus::UpToDate);
  assert_eq!(second["C"], TaskStatus::UpToDate);
  assert_eq!(second["D"], TaskStatus::UpToDate);

  // Modify A's output directly (out of band, not by re-running A). Only
  // B, C, D should recompute; A's own input (seed.txt) never changed.
  sleep(Duration::from_millis(10));
  write_file(&a, "modified-out-of-band");

  let third = run_to_completion(diamond_tasks(&seed, &a, &b, &c, &d), &mut store);
  assert_eq!(third["A"], TaskStatus::UpToDate);
  assert_eq!(third["B"], TaskStatus::Succeeded);
  assert_eq!(third["C"], TaskStatus::Succeeded);
  assert_eq!(third["D"], TaskStatus::Succeeded);
}

#[test]
fn scenario_5_reactive_cascade_halts_at_max_tasks() {
  let dir = temp_dir();
  let raw_dir = dir.path().join("raw");
  let stage2_dir = dir.path().join("stage2");
  std::fs::create_dir_all(&raw_dir).unwrap();
  write_file(&raw_dir.join("seed.txt"), "seed");

  let mut s1_inputs = HashMap::new();
  s1_inputs.insert("raw".to_string(), Input::file("<n>.txt", &raw_dir, FileChecker::Mtime).unwrap());
  let stage2_for_s1 = stage2_dir.clone();
  let s1 = TaskGenerator::new(
    "S1:<n>",
    s1_inputs,
    vec![Output::File(stage2_dir.join("<n>.json").to_string_lossy().to_string())],
    move |_set, _outputs, attrs| {
      let n = attrs.get("n").cloned().unwrap_or_default();
      let path = stage2_for_s1.join(format!("{n}.json"));
      vec![Action::Closure(Arc::new(move |_ctx| {
        std::fs::create_dir_all(path.parent().unwrap()).ok();
        std::fs::write(&path, "{}").map_err(|source| rebuild::BuildError::Io { path: path.clone(), source })?;
        Ok(())
      }))]
    },
  );

  let mut s2_inputs = HashMap::new();
  s2_inputs.insert("stage2".to_string(), Input::file("<n>.json", &stage2_dir, FileChecker::Mtime).unwrap());
  let raw_for_s2 = raw_dir.clone();
  let s2 = TaskGenerator::new(
    "S2:<n>",
    s2_inputs,
    vec![Output::File(raw_dir.join("<n>_next.txt").to_string_lossy().to_string())],
    move |_set, _outputs, attrs| {
      let n = attrs.get("n").cloned().unwrap_or_default();
      let path = raw_for_s2.join(format!("{n}_next.txt"));
      vec![Action::Closure(Arc::new(move |_ctx| {
        std::fs::write(&path, "next").map_err(|source| rebuild::BuildError::Io { path: path.clone(), source })?;
        Ok(())
      }))]
    },
  );

  let mut store = MemoryStore::new();
  let config = BuildConfig::default().with_max_tasks(5);
  let engine = ReactiveEngine::new(vec![s1, s2], config, NoopTracker);
  let result = engine.run(&mut store).unwrap();

  assert!(result.hit_limit);
  assert!(!result.converged());
  assert!(result.tasks_executed <= 5);
}
