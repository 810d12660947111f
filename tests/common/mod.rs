use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

pub fn temp_dir() -> TempDir {
  tempfile::tempdir().expect("failed to create temporary directory")
}

pub fn write_file(path: &Path, contents: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).expect("failed to create parent directory");
  }
  let mut file = std::fs::File::create(path).expect("failed to create file");
  file.write_all(contents.as_bytes()).expect("failed to write file");
  file.sync_all().expect("failed to sync file");
}
