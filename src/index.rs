//! Maps static prefixes of generator input patterns to the generators that
//! own them, so a batch of task outputs can be resolved to the generators
//! they might newly satisfy.

use std::collections::HashMap;

/// Generators are identified by name here (rather than held by reference)
/// so the index can be queried independently of generator ownership.
#[derive(Default)]
pub struct OutputPatternIndex {
  prefix_to_generators: HashMap<String, Vec<String>>,
}

impl OutputPatternIndex {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers every one of `generator_name`'s input static prefixes
  ///. A generator with no captures at all has the
  /// empty-string prefix, which matches every output.
  pub fn register_generator(&mut self, generator_name: &str, prefixes: &[String]) {
    for prefix in prefixes {
      let owners = self.prefix_to_generators.entry(normalize(prefix)).or_default();
      if !owners.iter().any(|name| name == generator_name) {
        owners.push(generator_name.to_string());
      }
    }
  }

  /// A generator is affected if an output begins with one of its
  /// registered prefixes, *or* the prefix begins with the output — the
  /// second arm covers directory-granularity outputs whose key is shorter
  /// than (and encompasses) a pattern's prefix. This asymmetry is
  /// deliberate and is exercised directly by the
  /// implicit-ordering-via-directory-target scenario.
  pub fn find_affected(&self, outputs: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut affected = Vec::new();
    for output in outputs {
      let normalized_output = normalize(output);
      for (prefix, generators) in &self.prefix_to_generators {
        if normalized_output.starts_with(prefix.as_str()) || prefix.starts_with(normalized_output.as_str()) {
          for name in generators {
            if seen.insert(name.clone()) {
              affected.push(name.clone());
            }
          }
        }
      }
    }
    affected
  }

  pub fn clear(&mut self) {
    self.prefix_to_generators.clear();
  }
}

/// Strips a trailing slash so `"a/b/"` and `"a/b"` compare equal, leaving
/// object-store URIs (`scheme://...`) otherwise untouched.
fn normalize(path: &str) -> String {
  if path.ends_with('/') && path.len() > 1 {
    path.trim_end_matches('/').to_string()
  } else {
    path.to_string()
  }
}
