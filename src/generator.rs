//! Expands a template into concrete tasks with rendered names, targets,
//! and actions.

use std::collections::HashMap;

use crate::error::Result;
use crate::groups::build_input_sets;
use crate::input::Input;
use crate::output::Output;
use crate::pattern::render_template;
use crate::task::{Action, Task};

/// A name template, labeled input patterns, output templates, and an
/// action factory that together expand into zero or more `Task`s.
pub struct TaskGenerator {
  pub name: String,
  pub inputs: HashMap<String, Input>,
  pub outputs: Vec<Output>,
  pub doc: Option<String>,
  action_factory: Box<dyn Fn(&crate::groups::InputSet, &[String], &HashMap<String, String>) -> Vec<Action>>,
}

impl TaskGenerator {
  pub fn new(
    name: impl Into<String>,
    inputs: HashMap<String, Input>,
    outputs: Vec<Output>,
    action_factory: impl Fn(&crate::groups::InputSet, &[String], &HashMap<String, String>) -> Vec<Action> + 'static,
  ) -> Self {
    Self { name: name.into(), inputs, outputs, doc: None, action_factory: Box::new(action_factory) }
  }

  pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
    self.doc = Some(doc.into());
    self
  }

  /// Expands every `InputSet` the pattern expander yields into a
  /// concrete `Task`. Restartable and side-effect-free with respect to
  /// anything but the filesystem read at call time:
  /// the reactive engine calls this many times over one run.
  pub fn generate(&self) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();
    for input_set in build_input_sets(&self.inputs)? {
      let mut output_paths = Vec::new();
      let mut targets = Vec::new();
      for output in &self.outputs {
        let (path, target) = output.create(&input_set.attrs)?;
        output_paths.push(path);
        targets.push(target);
      }

      let actions = (self.action_factory)(&input_set, &output_paths, &input_set.attrs);

      let rendered_name = render_template(&self.name, &input_set.attrs)?;
      let rendered_doc = self.doc.as_ref().map(|doc| render_template(doc, &input_set.attrs)).transpose()?;

      let mut task = Task::new(rendered_name)
        .with_actions(actions)
        .with_dependencies(input_set.all_dependencies())
        .with_targets(targets);
      task.doc = rendered_doc;
      tasks.push(task);
    }
    Ok(tasks)
  }
}

#[cfg(test)]
mod test {
  use tempfile::TempDir;

  use crate::stamp::FileChecker;

  use super::*;

  #[test]
  fn generates_one_task_per_capture_value() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("main.c"), "").unwrap();
    std::fs::write(dir.path().join("utils.c"), "").unwrap();

    let mut inputs = HashMap::new();
    inputs.insert("source".to_string(), Input::file("<module>.c", dir.path(), FileChecker::Mtime).unwrap());

    let generator = TaskGenerator::new(
      "compile:<module>",
      inputs,
      vec![Output::File("build/<module>.o".to_string())],
      |_input_set, _outputs, _attrs| vec![Action::Sequence(Vec::new())],
    );

    let tasks = generator.generate().unwrap();
    assert_eq!(tasks.len(), 2);
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"compile:main"));
    assert!(names.contains(&"compile:utils"));
  }
}
