/* src/cli/core/src/media.rs */

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use mirror_engine::ManifestCache;

/// Resolve `request` through the manifest at `manifest`. Raw, decoded and
/// re-encoded key variants are all tried.
pub fn resolve_media(manifest: &Path, request: &str) -> Result<String> {
  let cache = ManifestCache::load_or_refresh(manifest, None)
    .with_context(|| format!("failed to load media manifest {}", manifest.display()))?;
  if cache.is_empty() {
    bail!("media manifest {} has no entries", manifest.display());
  }
  match cache.resolve(request) {
    Some(local) => Ok(local.to_string()),
    None => bail!("no media entry for {request} in {}", manifest.display()),
  }
}

pub fn run_media(manifest: &Path, request: &str) -> Result<()> {
  let local = resolve_media(manifest, request)?;
  let mut stdout = std::io::stdout().lock();
  writeln!(stdout, "{local}").context("failed to write to stdout")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn manifest_in(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("media-manifest.json");
    std::fs::write(
      &path,
      r#"{"media":{
        "/api/media/file/Blood%20Test.webp":"/media/blood-test.webp",
        "/api/media/file/van.png":"https://cdn.example.com/van.png"
      }}"#,
    )
    .unwrap();
    path
  }

  #[test]
  fn decoded_request_finds_encoded_key() {
    let tmp = tempfile::tempdir().unwrap();
    let manifest = manifest_in(tmp.path());
    assert_eq!(resolve_media(&manifest, "/api/media/file/Blood Test.webp").unwrap(), "/media/blood-test.webp");
    assert_eq!(resolve_media(&manifest, "api/media/file/Blood+Test.webp").unwrap(), "/media/blood-test.webp");
  }

  #[test]
  fn absolute_target_is_not_local() {
    let tmp = tempfile::tempdir().unwrap();
    let manifest = manifest_in(tmp.path());
    let err = resolve_media(&manifest, "/api/media/file/van.png").unwrap_err();
    assert!(err.to_string().contains("no media entry"));
  }

  #[test]
  fn missing_manifest_reports_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let err = resolve_media(&tmp.path().join("none.json"), "/api/media/file/x.png").unwrap_err();
    assert!(err.to_string().contains("has no entries"));
  }
}
