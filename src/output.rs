//! Output patterns: render `<name>` placeholders into a concrete target.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::pattern::render_template;
use crate::target::Target;

pub enum Output {
  File(String),
  Directory(String),
}

impl Output {
  pub fn render(&self, attrs: &HashMap<String, String>) -> Result<String> {
    match self {
      Output::File(pattern) => render_template(pattern, attrs),
      Output::Directory(pattern) => render_template(pattern, attrs),
    }
  }

  /// Renders the pattern and builds the corresponding `Target`.
  pub fn create(&self, attrs: &HashMap<String, String>) -> Result<(String, Target)> {
    let rendered = self.render(attrs)?;
    let target = match self {
      Output::File(_) => Target::File { path: PathBuf::from(&rendered) },
      Output::Directory(_) => Target::directory(&rendered),
    };
    Ok((rendered, target))
  }
}
