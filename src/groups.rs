//! Input grouping: permute captured attribute values across labeled
//! inputs into `InputSet`s.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::dependency::Dependency;
use crate::error::Result;
use crate::input::{CaptureMatch, Input};

/// One item in an `InputSet`: either a single dependency (for a
/// non-list-valued label) or a list (for a list-valued label).
#[derive(Clone, Debug)]
pub enum InputItem {
  Single(Dependency),
  List(Vec<Dependency>),
}

/// One cartesian assignment of capture values, paired with the
/// dependencies each label resolved to under that assignment.
#[derive(Clone, Debug, Default)]
pub struct InputSet {
  pub attrs: HashMap<String, String>,
  pub items: HashMap<String, InputItem>,
}

impl InputSet {
  pub fn get(&self, label: &str) -> Option<&InputItem> {
    self.items.get(label)
  }

  /// Flattens every item's dependencies into a single list.
  pub fn all_dependencies(&self) -> Vec<Dependency> {
    let mut deps = Vec::new();
    for item in self.items.values() {
      match item {
        InputItem::Single(dep) => deps.push(dep.clone()),
        InputItem::List(list) => deps.extend(list.iter().cloned()),
      }
    }
    deps
  }
}

/// Generates an `InputSet` for every valid combination of captured
/// attribute values across `inputs`.
pub fn build_input_sets(inputs: &HashMap<String, Input>) -> Result<Vec<InputSet>> {
  if inputs.is_empty() {
    return Ok(Vec::new());
  }

  let mut matches_by_label: HashMap<String, Vec<CaptureMatch>> = HashMap::new();
  for (label, input) in inputs {
    matches_by_label.insert(label.clone(), input.matches()?);
  }

  let all_capture_names: BTreeSet<String> =
    inputs.values().flat_map(|input| input.capture_names().iter().cloned()).collect();

  if all_capture_names.is_empty() {
    return Ok(build_zero_capture_set(inputs, &matches_by_label).into_iter().collect());
  }

  let mut attr_values: BTreeMap<String, BTreeSet<String>> =
    all_capture_names.iter().cloned().map(|name| (name, BTreeSet::new())).collect();
  for (label, input) in inputs {
    for m in &matches_by_label[label] {
      for name in input.capture_names() {
        if let Some(value) = m.capture(name) {
          attr_values.get_mut(name).expect("name came from all_capture_names").insert(value.to_string());
        }
      }
    }
  }

  // Empty-product rule: a capture with zero observed values collapses the
  // whole permutation to nothing.
  if attr_values.values().any(|values| values.is_empty()) {
    return Ok(Vec::new());
  }

  let attr_names: Vec<String> = attr_values.keys().cloned().collect();
  let value_lists: Vec<Vec<String>> = attr_names.iter().map(|name| attr_values[name].iter().cloned().collect()).collect();

  let mut result = Vec::new();
  for assignment in cartesian_product(&value_lists) {
    let attrs: HashMap<String, String> = attr_names.iter().cloned().zip(assignment).collect();

    let mut items = HashMap::new();
    let mut missing_required = false;

    for (label, input) in inputs {
      let consistent: Vec<&CaptureMatch> = matches_by_label[label].iter()
        .filter(|m| input.capture_names().iter().all(|name| {
          attrs.get(name).map_or(true, |v| m.capture(name) == Some(v.as_str()))
        }))
        .collect();

      if input.is_list {
        items.insert(label.clone(), InputItem::List(consistent.iter().map(|m| m.dependency.clone()).collect()));
      } else if let Some(first) = consistent.first() {
        items.insert(label.clone(), InputItem::Single(first.dependency.clone()));
      }

      if input.required && consistent.is_empty() {
        missing_required = true;
      }
    }

    if !missing_required {
      result.push(InputSet { attrs, items });
    }
  }

  Ok(result)
}

fn build_zero_capture_set(inputs: &HashMap<String, Input>, matches_by_label: &HashMap<String, Vec<CaptureMatch>>) -> Option<InputSet> {
  let mut items = HashMap::new();
  let mut missing_required = false;
  for (label, input) in inputs {
    let matches = &matches_by_label[label];
    if input.is_list {
      items.insert(label.clone(), InputItem::List(matches.iter().map(|m| m.dependency.clone()).collect()));
    } else if let Some(first) = matches.first() {
      items.insert(label.clone(), InputItem::Single(first.dependency.clone()));
    }
    if input.required && matches.is_empty() {
      missing_required = true;
    }
  }
  if missing_required { None } else { Some(InputSet { attrs: HashMap::new(), items }) }
}

fn cartesian_product(lists: &[Vec<String>]) -> Vec<Vec<String>> {
  lists.iter().fold(vec![Vec::new()], |acc, list| {
    acc.into_iter()
      .flat_map(|prefix| list.iter().map(move |value| {
        let mut next = prefix.clone();
        next.push(value.clone());
        next
      }))
      .collect()
  })
}

#[cfg(test)]
mod test {
  use tempfile::TempDir;

  use crate::stamp::FileChecker;

  use super::*;

  fn setup_arch_module(dir: &TempDir) {
    for (arch, module) in [("x86", "main"), ("x86", "utils"), ("arm", "main")] {
      let path = dir.path().join(arch);
      std::fs::create_dir_all(&path).unwrap();
      std::fs::write(path.join(format!("{module}.c")), "").unwrap();
    }
  }

  #[test]
  fn permutes_across_captures() {
    let dir = TempDir::new().unwrap();
    setup_arch_module(&dir);
    let mut inputs = HashMap::new();
    inputs.insert("source".to_string(), Input::file("<arch>/<module>.c", dir.path(), FileChecker::Mtime).unwrap());

    let sets = build_input_sets(&inputs).unwrap();
    assert_eq!(sets.len(), 3);
  }

  #[test]
  fn zero_captures_yields_single_set() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    let mut inputs = HashMap::new();
    inputs.insert("all".to_string(), Input::file("*.txt", dir.path(), FileChecker::Mtime).unwrap());

    let sets = build_input_sets(&inputs).unwrap();
    assert_eq!(sets.len(), 1);
    match sets[0].get("all").unwrap() {
      InputItem::List(deps) => assert_eq!(deps.len(), 2),
      InputItem::Single(_) => panic!("expected list-valued (auto-detected from final *.txt segment)"),
    }
  }

  #[test]
  fn empty_inputs_yields_nothing() {
    let inputs = HashMap::new();
    assert!(build_input_sets(&inputs).unwrap().is_empty());
  }

  #[test]
  fn required_label_with_no_match_discards_assignment() {
    let dir = TempDir::new().unwrap();
    setup_arch_module(&dir);
    // config/<arch>.json never exists, so every assignment is discarded.
    let mut inputs = HashMap::new();
    inputs.insert("source".to_string(), Input::file("<arch>/<module>.c", dir.path(), FileChecker::Mtime).unwrap());
    inputs.insert("config".to_string(), Input::file("config/<arch>.json", dir.path(), FileChecker::Mtime).unwrap());

    assert!(build_input_sets(&inputs).unwrap().is_empty());
  }
}
