//! A reactive, incrementally-correct build engine.
//!
//! Generators expand filesystem-discovered inputs into concrete tasks, a
//! matching engine wires implicit ordering edges between tasks via the
//! targets they produce and consume, and a streaming scheduler runs tasks
//! to a fixed point: regenerating affected generators after every
//! completion rather than in discrete waves.

pub mod config;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fs_util;
pub mod generator;
pub mod groups;
pub mod index;
pub mod input;
pub mod matching;
pub mod merger;
pub mod output;
pub mod pattern;
pub mod registry;
pub mod stamp;
pub mod store;
pub mod target;
pub mod task;
pub mod tracker;
pub mod trie;

pub use config::BuildConfig;
pub use engine::{ReactiveEngine, ReactiveResult};
pub use error::{BuildError, Result};
pub use executor::{Executor, ReadyTask, TaskStatus};
pub use generator::TaskGenerator;
pub use registry::TaskRegistry;
pub use store::{MemoryStore, StateStore};
pub use task::{Action, Task};
pub use tracker::{NoopTracker, Tracker};
