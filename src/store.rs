//! Per-task key/value persistence of change-detection state, kept
//! independent of the task graph so the graph can be rebuilt fresh every
//! run while state survives across runs.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{BuildError, Result, StoreSerdeError};
use crate::stamp::FileState;

/// `(task_name, dependency_key) -> state` persistence, plus one result
/// value per task.
pub trait StateStore {
  fn get(&self, task_name: &str, dep_key: &str) -> Option<FileState>;
  fn put(&mut self, task_name: &str, dep_key: &str, state: FileState);
  fn put_result(&mut self, task_name: &str, value: String);
  fn get_result(&self, task_name: &str) -> Option<String>;
  fn clear(&mut self, task_name: &str);
  fn commit(&mut self) -> Result<()>;
}

/// An in-memory store; the default, and what the test suite uses
/// throughout.
#[derive(Default)]
pub struct MemoryStore {
  states: HashMap<(String, String), FileState>,
  results: HashMap<String, String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl StateStore for MemoryStore {
  fn get(&self, task_name: &str, dep_key: &str) -> Option<FileState> {
    self.states.get(&(task_name.to_string(), dep_key.to_string())).cloned()
  }

  fn put(&mut self, task_name: &str, dep_key: &str, state: FileState) {
    self.states.insert((task_name.to_string(), dep_key.to_string()), state);
  }

  fn put_result(&mut self, task_name: &str, value: String) {
    self.results.insert(task_name.to_string(), value);
  }

  fn get_result(&self, task_name: &str) -> Option<String> {
    self.results.get(task_name).cloned()
  }

  fn clear(&mut self, task_name: &str) {
    self.states.retain(|(name, _), _| name != task_name);
    self.results.remove(task_name);
  }

  fn commit(&mut self) -> Result<()> {
    Ok(()) // nothing buffered; every write is already visible.
  }
}

/// A JSON-encoded snapshot read whole at construction and written whole on
/// `commit`.
#[cfg(feature = "serde")]
pub struct FileStore {
  path: PathBuf,
  memory: MemoryStore,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize, Default)]
struct Snapshot {
  states: HashMap<String, FileState>,
  results: HashMap<String, String>,
}

#[cfg(feature = "serde")]
impl FileStore {
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let memory = if path.exists() {
      let contents = std::fs::read_to_string(&path).map_err(|source| BuildError::StoreIo { task: String::new(), source })?;
      let snapshot: Snapshot = serde_json::from_str(&contents)
        .map_err(|e| BuildError::StoreSerde(StoreSerdeError::from(e)))?;
      let mut memory = MemoryStore::new();
      for (combined_key, state) in snapshot.states {
        if let Some((task_name, dep_key)) = combined_key.split_once('\u{1}') {
          memory.put(task_name, dep_key, state);
        }
      }
      memory.results = snapshot.results;
      memory
    } else {
      MemoryStore::new()
    };
    Ok(Self { path, memory })
  }

  fn snapshot(&self) -> Snapshot {
    let states = self.memory.states.iter()
      .map(|((task_name, dep_key), state)| (format!("{task_name}\u{1}{dep_key}"), state.clone()))
      .collect();
    Snapshot { states, results: self.memory.results.clone() }
  }
}

#[cfg(feature = "serde")]
impl StateStore for FileStore {
  fn get(&self, task_name: &str, dep_key: &str) -> Option<FileState> {
    self.memory.get(task_name, dep_key)
  }

  fn put(&mut self, task_name: &str, dep_key: &str, state: FileState) {
    self.memory.put(task_name, dep_key, state);
  }

  fn put_result(&mut self, task_name: &str, value: String) {
    self.memory.put_result(task_name, value);
  }

  fn get_result(&self, task_name: &str) -> Option<String> {
    self.memory.get_result(task_name)
  }

  fn clear(&mut self, task_name: &str) {
    self.memory.clear(task_name);
  }

  fn commit(&mut self) -> Result<()> {
    let serialized = serde_json::to_string_pretty(&self.snapshot())
      .map_err(|e| BuildError::StoreSerde(StoreSerdeError::from(e)))?;
    std::fs::write(&self.path, serialized).map_err(|source| BuildError::StoreIo { task: String::new(), source })
  }
}
