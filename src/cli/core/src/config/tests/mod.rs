/* src/cli/core/src/config/tests/mod.rs */

use std::path::{Path, PathBuf};

use super::loader::*;
use super::types::*;

mod discovery;

fn write_config(dir: &Path, body: &str) -> PathBuf {
  let path = dir.join(CONFIG_FILE);
  std::fs::write(&path, body).unwrap();
  path
}
