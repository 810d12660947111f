//! Implicit ordering derived from target matching, and exact-vs-prefix
//! precedence.

mod common;

use rebuild::dependency::Dependency;
use rebuild::executor::{Executor, TaskStatus};
use rebuild::matching::MatchingEngine;
use rebuild::stamp::FileChecker;
use rebuild::store::MemoryStore;
use rebuild::target::Target;
use rebuild::tracker::NoopTracker;
use rebuild::Task;

use common::{temp_dir, write_file};

#[test]
fn scenario_4_implicit_ordering_via_directory_target() {
  let dir = temp_dir();
  let out_dir = dir.path().join("out");
  let x_path = out_dir.join("x.txt");

  let generator_task = Task::new("G")
    .with_targets(vec![Target::directory(&out_dir)])
    .with_actions(vec![rebuild::Action::Closure(std::sync::Arc::new({
      let x_path = x_path.clone();
      move |_ctx| {
        write_file(&x_path, "produced");
        Ok(())
      }
    }))]);
  let consumer_task =
    Task::new("C").with_dependencies(vec![Dependency::file(&x_path, FileChecker::Mtime)]);

  let mut store = MemoryStore::new();
  let mut executor = Executor::new(vec![generator_task, consumer_task], &mut store, NoopTracker).unwrap();

  let mut first = executor.next_ready().unwrap().unwrap();
  assert_eq!(first.name, "G", "G must be scheduled strictly before C");
  executor.execute_and_submit(&mut first).unwrap();
  assert_eq!(first.status, TaskStatus::Succeeded);

  let mut second = executor.next_ready().unwrap().unwrap();
  assert_eq!(second.name, "C");
  assert!(second.should_run);
  executor.execute_and_submit(&mut second).unwrap();
  assert_eq!(second.status, TaskStatus::Succeeded);
}

#[test]
fn scenario_6_prefix_precedence() {
  let mut engine = MatchingEngine::new();
  engine.register_target(&Target::directory("/output/"), "D").unwrap();
  engine.register_target(&Target::file("/output/special.txt"), "F").unwrap();

  assert_eq!(engine.find_producer("/output/special.txt"), Some("F".to_string()));
  assert_eq!(engine.find_producer("/output/other.txt"), Some("D".to_string()));
}

#[test]
fn duplicate_exact_target_is_a_graph_build_error() {
  let t1 = Task::new("t1").with_targets(vec![Target::file("/out/a.txt")]);
  let t2 = Task::new("t2").with_targets(vec![Target::file("/out/a.txt")]);
  let mut store = MemoryStore::new();
  let err = Executor::new(vec![t1, t2], &mut store, NoopTracker).unwrap_err();
  assert!(matches!(err, rebuild::BuildError::DuplicateTarget { .. }));
}
