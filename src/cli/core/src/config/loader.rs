/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::types::{InputOverrides, MirrorConfig, ResolvedInputs};

pub const CONFIG_FILE: &str = "mirror.toml";

/// Walk from `start` up to the filesystem root and return the first
/// `mirror.toml` found.
pub fn find_mirror_config(start: &Path) -> Option<PathBuf> {
  start.ancestors().map(|dir| dir.join(CONFIG_FILE)).find(|candidate| candidate.is_file())
}

pub fn load_mirror_config(path: &Path) -> Result<MirrorConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: MirrorConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.render.validate().with_context(|| format!("invalid {}", path.display()))?;
  Ok(config)
}

/// Load the config named on the command line, or discover one upward from
/// `cwd`. Without either, built-in defaults apply relative to `cwd`.
///
/// Returns the config and the directory its relative paths resolve against.
pub fn load_or_discover(explicit: Option<&Path>, cwd: &Path) -> Result<(MirrorConfig, PathBuf)> {
  let path = match explicit {
    Some(path) => {
      if !path.is_file() {
        bail!("config file not found: {}", path.display());
      }
      Some(path.to_path_buf())
    }
    None => find_mirror_config(cwd),
  };

  let Some(path) = path else {
    tracing::debug!(cwd = %cwd.display(), "no {CONFIG_FILE} found, using defaults");
    return Ok((MirrorConfig::default(), cwd.to_path_buf()));
  };

  let config = load_mirror_config(&path)?;
  let base_dir = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
  tracing::debug!(config = %path.display(), "loaded config");
  Ok((config, base_dir))
}

/// Merge `overrides` over `config`. Paths from the file resolve against
/// `base_dir`; command-line paths are taken as given.
pub fn resolve_inputs(config: &MirrorConfig, base_dir: &Path, overrides: InputOverrides) -> ResolvedInputs {
  let from_file = |value: &str| base_dir.join(value);
  let paths = &config.paths;

  ResolvedInputs {
    snapshot: overrides.snapshot.unwrap_or_else(|| from_file(&paths.snapshot)),
    content: overrides.content.unwrap_or_else(|| from_file(&paths.content)),
    manifest: overrides.manifest.unwrap_or_else(|| from_file(&paths.manifest)),
    injections: overrides.injections.or_else(|| paths.injections.as_deref().map(from_file)),
    out: overrides.out.or_else(|| paths.out.as_deref().map(from_file)),
    strict: overrides.strict || config.render.strict,
    static_prefix_from: config.render.static_prefix_from.clone(),
    static_prefix_to: config.render.static_prefix_to.clone(),
  }
}
