//! Compiles a `<name>`/`*` pattern into a glob expression and an anchored
//! capture regex.

use regex::Regex;

use crate::error::{BuildError, Result};

/// A compiled pattern: a glob used to enumerate candidate resources, and a
/// capture regex used to extract named attribute values from a match key.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
  pub source: String,
  pub glob: String,
  capture_regex: Regex,
  pub capture_names: Vec<String>,
}

impl CompiledPattern {
  pub fn compile(pattern: &str) -> Result<Self> {
    let capture_scan = Regex::new(r"<(\w+)>").expect("static regex is valid");

    let mut capture_names = Vec::new();
    let mut glob_parts = Vec::new();
    let mut regex_parts = Vec::new();
    let mut last_end = 0;

    for m in capture_scan.captures_iter(pattern) {
      let whole = m.get(0).expect("group 0 always matches");
      let name = m.get(1).expect("named group always captures").as_str().to_string();

      let literal = &pattern[last_end..whole.start()];
      glob_parts.push(literal.to_string());
      regex_parts.push(escape_for_regex(literal));

      glob_parts.push("*".to_string());
      regex_parts.push(format!("(?P<{name}>[^/]+)"));

      capture_names.push(name);
      last_end = whole.end();
    }

    let trailing = &pattern[last_end..];
    glob_parts.push(trailing.to_string());
    regex_parts.push(escape_for_regex(trailing));

    let glob = glob_parts.concat();
    let regex_source = format!("^{}$", regex_parts.concat());
    let capture_regex = Regex::new(&regex_source)
      .map_err(|e| BuildError::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() })?;

    Ok(Self { source: pattern.to_string(), glob, capture_regex, capture_names })
  }

  /// `true` if the pattern's final path component contains `*`, which
  /// auto-marks the owning input as list-valued.
  pub fn auto_is_list(&self) -> bool {
    self.source.rsplit('/').next().unwrap_or(&self.source).contains('*')
  }

  /// Matches `match_key` (a path relative to the input's base directory,
  /// or a bare object-store key) and extracts named captures.
  pub fn match_key(&self, match_key: &str) -> Option<Vec<(String, String)>> {
    let captures = self.capture_regex.captures(match_key)?;
    Some(self.capture_names.iter()
      .map(|name| (name.clone(), captures.name(name).expect("declared capture always present on match").as_str().to_string()))
      .collect())
  }

  /// The static, placeholder-free prefix of the pattern, trimmed to the
  /// last `/`. `"a/b/<x>/c"` -> `"a/b/"`; `"<x>.txt"` -> `""`.
  pub fn static_prefix(&self) -> String {
    static_prefix_of(&self.source)
  }
}

/// Escapes a literal pattern segment for regex, but converts any `*`
/// wildcards within it to `[^/]*` rather than escaping them literally.
fn escape_for_regex(segment: &str) -> String {
  segment.split('*').map(regex::escape).collect::<Vec<_>>().join("[^/]*")
}

pub fn static_prefix_of(pattern: &str) -> String {
  let cut = pattern.find('<').unwrap_or(pattern.len());
  let prefix = &pattern[..cut];
  match prefix.rfind('/') {
    Some(idx) => prefix[..=idx].to_string(),
    None => String::new(),
  }
}

/// Renders `<name>` occurrences in `template` by substituting `attrs`. Fails
/// if a capture remains unrendered because no attr supplies it.
pub fn render_template(template: &str, attrs: &std::collections::HashMap<String, String>) -> Result<String> {
  let mut rendered = template.to_string();
  for (key, value) in attrs {
    rendered = rendered.replace(&format!("<{key}>"), value);
  }
  let leftover = Regex::new(r"<(\w+)>").expect("static regex is valid");
  if let Some(caps) = leftover.captures(&rendered) {
    let name = caps.get(1).expect("named group always captures").as_str().to_string();
    return Err(BuildError::PatternError { pattern: template.to_string(), name });
  }
  Ok(rendered)
}
