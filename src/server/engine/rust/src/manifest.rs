/* src/server/engine/rust/src/manifest.rs */

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use mirror_injector::build_media_key_variants;
use serde_json::Value;

use crate::error::ManifestError;

/// The media map of one manifest file version, keyed by canonical request
/// path. `mtime` is `None` when the file did not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestCache {
  pub mtime: Option<SystemTime>,
  pub media: BTreeMap<String, String>,
}

fn parse_media(text: &str) -> Option<BTreeMap<String, String>> {
  let doc: Value = serde_json::from_str(text).ok()?;
  let media = doc.get("media")?.as_object()?;
  Some(media.iter().filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string()))).collect())
}

impl ManifestCache {
  /// Reload `path` unless its mtime matches `previous`.
  ///
  /// A missing file yields an empty map. Unreadable JSON, or a document
  /// without a `media` object, yields an empty map and a warning.
  pub fn load_or_refresh(path: &Path, previous: Option<&ManifestCache>) -> Result<ManifestCache, ManifestError> {
    let meta = match fs::metadata(path) {
      Ok(meta) => meta,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ManifestCache::default()),
      Err(source) => return Err(ManifestError::Metadata { path: path.to_path_buf(), source }),
    };
    let mtime = meta.modified().ok();

    if let Some(previous) = previous
      && mtime.is_some()
      && previous.mtime == mtime
    {
      return Ok(previous.clone());
    }

    let text =
      fs::read_to_string(path).map_err(|source| ManifestError::Read { path: path.to_path_buf(), source })?;
    let media = parse_media(&text).unwrap_or_else(|| {
      tracing::warn!(path = %path.display(), "media manifest is not valid JSON with a media object, using an empty map");
      BTreeMap::new()
    });
    tracing::debug!(path = %path.display(), entries = media.len(), "media manifest loaded");
    Ok(ManifestCache { mtime, media })
  }

  /// Map a media request path to its local path. Every key variant is tried
  /// and only root-relative targets count.
  pub fn resolve(&self, request: &str) -> Option<&str> {
    build_media_key_variants(request)
      .iter()
      .filter_map(|key| self.media.get(key))
      .map(String::as_str)
      .find(|target| target.starts_with('/'))
  }

  pub fn len(&self) -> usize {
    self.media.len()
  }

  pub fn is_empty(&self) -> bool {
    self.media.is_empty()
  }
}

/// A `ManifestCache` shared by concurrent renders. A refresh builds the new
/// value outside the lock and swaps the `Arc`; readers keep the version they
/// cloned.
#[derive(Debug, Default)]
pub struct SharedManifestCache {
  current: Mutex<Arc<ManifestCache>>,
}

impl SharedManifestCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn snapshot(&self) -> Arc<ManifestCache> {
    Arc::clone(&self.current.lock().unwrap_or_else(PoisonError::into_inner))
  }

  /// Refresh from `path` and return the current version. Two callers racing
  /// on a changed file may both reload it.
  pub fn get(&self, path: &Path) -> Result<Arc<ManifestCache>, ManifestError> {
    let previous = self.snapshot();
    let next = ManifestCache::load_or_refresh(path, Some(&previous))?;
    if next == *previous {
      return Ok(previous);
    }
    let next = Arc::new(next);
    *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
    Ok(next)
  }
}
