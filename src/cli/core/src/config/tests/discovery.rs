/* src/cli/core/src/config/tests/discovery.rs */

use super::*;

#[test]
fn defaults_without_any_file() {
  let config: MirrorConfig = toml::from_str("").unwrap();
  assert_eq!(config.paths.snapshot, "src/mirror/live-index.html");
  assert_eq!(config.paths.content, "content/site/mirror-content.json");
  assert_eq!(config.paths.manifest, "src/generated/media-manifest.json");
  assert_eq!(config.paths.injections, None);
  assert!(!config.render.strict);
  assert_eq!(config.render.static_prefix_from, "/_next/static/");
  assert_eq!(config.render.static_prefix_to, "/mirror_next/static/");
}

#[test]
fn partial_sections_keep_remaining_defaults() {
  let config: MirrorConfig = toml::from_str(
    r#"
[paths]
snapshot = "capture/index.html"

[render]
strict = true
"#,
  )
  .unwrap();
  assert_eq!(config.paths.snapshot, "capture/index.html");
  assert_eq!(config.paths.manifest, "src/generated/media-manifest.json");
  assert!(config.render.strict);
  assert_eq!(config.render.static_prefix_to, "/mirror_next/static/");
}

#[test]
fn discovers_config_in_ancestor() {
  let tmp = tempfile::tempdir().unwrap();
  let nested = tmp.path().join("a/b/c");
  std::fs::create_dir_all(&nested).unwrap();
  let written = write_config(tmp.path(), "[paths]\nout = \"dist/index.html\"\n");

  assert_eq!(find_mirror_config(&nested), Some(written));

  let (config, base_dir) = load_or_discover(None, &nested).unwrap();
  assert_eq!(config.paths.out.as_deref(), Some("dist/index.html"));
  assert_eq!(base_dir, tmp.path());
}

#[test]
fn no_config_falls_back_to_cwd() {
  let tmp = tempfile::tempdir().unwrap();
  // Only meaningful when no ancestor of the temp dir carries a mirror.toml.
  if find_mirror_config(tmp.path()).is_some() {
    return;
  }
  let (config, base_dir) = load_or_discover(None, tmp.path()).unwrap();
  assert_eq!(base_dir, tmp.path());
  assert_eq!(config.paths.snapshot, "src/mirror/live-index.html");
}

#[test]
fn explicit_missing_config_is_an_error() {
  let tmp = tempfile::tempdir().unwrap();
  let err = load_or_discover(Some(&tmp.path().join("nope.toml")), tmp.path()).unwrap_err();
  assert!(err.to_string().contains("config file not found"));
}

#[test]
fn malformed_toml_names_the_file() {
  let tmp = tempfile::tempdir().unwrap();
  let path = write_config(tmp.path(), "[paths\nsnapshot = 1");
  let err = load_mirror_config(&path).unwrap_err();
  assert!(err.to_string().contains("failed to parse"));
}

#[test]
fn prefix_without_slashes_rejected() {
  let tmp = tempfile::tempdir().unwrap();
  let path = write_config(tmp.path(), "[render]\nstatic_prefix_to = \"mirror_next/static\"\n");
  let err = load_mirror_config(&path).unwrap_err();
  let chain = format!("{err:#}");
  assert!(chain.contains("render.static_prefix_to must start and end with '/'"), "{chain}");
}
