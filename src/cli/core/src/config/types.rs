/* src/cli/core/src/config/types.rs */

use std::path::PathBuf;

use anyhow::{Result, bail};
use mirror_engine::{DEFAULT_STATIC_PREFIX_FROM, DEFAULT_STATIC_PREFIX_TO};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
  #[serde(default)]
  pub paths: PathsSection,
  #[serde(default)]
  pub render: RenderSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
  #[serde(default = "default_snapshot")]
  pub snapshot: String,
  #[serde(default = "default_content")]
  pub content: String,
  #[serde(default = "default_manifest")]
  pub manifest: String,
  pub injections: Option<String>,
  pub out: Option<String>,
}

impl Default for PathsSection {
  fn default() -> Self {
    Self {
      snapshot: default_snapshot(),
      content: default_content(),
      manifest: default_manifest(),
      injections: None,
      out: None,
    }
  }
}

fn default_snapshot() -> String {
  "src/mirror/live-index.html".to_string()
}

fn default_content() -> String {
  "content/site/mirror-content.json".to_string()
}

fn default_manifest() -> String {
  "src/generated/media-manifest.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderSection {
  #[serde(default)]
  pub strict: bool,
  #[serde(default = "default_prefix_from")]
  pub static_prefix_from: String,
  #[serde(default = "default_prefix_to")]
  pub static_prefix_to: String,
}

impl Default for RenderSection {
  fn default() -> Self {
    Self { strict: false, static_prefix_from: default_prefix_from(), static_prefix_to: default_prefix_to() }
  }
}

fn default_prefix_from() -> String {
  DEFAULT_STATIC_PREFIX_FROM.to_string()
}

fn default_prefix_to() -> String {
  DEFAULT_STATIC_PREFIX_TO.to_string()
}

impl RenderSection {
  pub fn validate(&self) -> Result<()> {
    for (key, value) in
      [("static_prefix_from", &self.static_prefix_from), ("static_prefix_to", &self.static_prefix_to)]
    {
      if !value.starts_with('/') || !value.ends_with('/') {
        bail!("render.{key} must start and end with '/', got \"{value}\"");
      }
    }
    Ok(())
  }
}

/// Inputs of one render after config defaults and command-line overrides are
/// merged. Every path is absolute or relative to the current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputs {
  pub snapshot: PathBuf,
  pub content: PathBuf,
  pub manifest: PathBuf,
  pub injections: Option<PathBuf>,
  pub out: Option<PathBuf>,
  pub strict: bool,
  pub static_prefix_from: String,
  pub static_prefix_to: String,
}

/// Command-line values that take precedence over `mirror.toml`.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
  pub snapshot: Option<PathBuf>,
  pub content: Option<PathBuf>,
  pub manifest: Option<PathBuf>,
  pub injections: Option<PathBuf>,
  pub out: Option<PathBuf>,
  pub strict: bool,
}
