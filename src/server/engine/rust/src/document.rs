/* src/server/engine/rust/src/document.rs */

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use mirror_injector::escape_html;
use regex::Regex;
use serde_json::Value;

use crate::error::MirrorError;
use crate::patch::{PatchReport, apply_content_patches};

pub const DEFAULT_STATIC_PREFIX_FROM: &str = "/_next/static/";
pub const DEFAULT_STATIC_PREFIX_TO: &str = "/mirror_next/static/";

const GUARD_FILE: &str = "guard.js";
const OVERRIDES_FILE: &str = "overrides.css";
const RUNTIME_FILE: &str = "runtime.js";

fn html_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<html\b[^>]*>").unwrap())
}

fn body_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<body\b[^>]*>").unwrap())
}

fn head_inner_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)<head\b[^>]*>(.*?)</head>").unwrap())
}

fn body_inner_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body>").unwrap())
}

fn attr_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"([:@A-Za-z0-9_-]+)(?:="([^"]*)")?"#).unwrap())
}

fn decode_entities(s: &str) -> String {
  s.replace("&amp;", "&")
    .replace("&quot;", "\"")
    .replace("&#x27;", "'")
    .replace("&#39;", "'")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
}

/// Attributes of one opening tag in source order, values entity-decoded.
/// Valueless attributes carry an empty string.
fn parse_attrs(open_tag: &str, tag: &str) -> Vec<(String, String)> {
  let inner = open_tag.get(tag.len() + 1..open_tag.len().saturating_sub(1)).unwrap_or_default();
  let mut attrs: Vec<(String, String)> = Vec::new();
  for caps in attr_re().captures_iter(inner) {
    let name = caps[1].to_string();
    let value = caps.get(2).map(|m| decode_entities(m.as_str())).unwrap_or_default();
    match attrs.iter_mut().find(|(existing, _)| *existing == name) {
      Some(slot) => slot.1 = value,
      None => attrs.push((name, value)),
    }
  }
  attrs
}

fn take_attr(attrs: &mut Vec<(String, String)>, name: &str) -> Option<String> {
  let index = attrs.iter().position(|(key, _)| key == name)?;
  Some(attrs.remove(index).1)
}

fn render_attrs(attrs: &[(String, String)]) -> String {
  attrs
    .iter()
    .map(|(name, value)| if value.is_empty() { format!(" {name}") } else { format!(" {name}=\"{}\"", escape_html(value)) })
    .collect()
}

fn inner<'a>(re: &Regex, html: &'a str) -> &'a str {
  re.captures(html).and_then(|caps| caps.get(1)).map_or("", |m| m.as_str())
}

/// JSON for an inline script: `<` is escaped so the payload cannot close the
/// surrounding tag.
pub fn inline_script_json(value: &Value) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()).replace('<', "\\u003c")
}

/// Companion files inlined into every rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Injections {
  pub guard: String,
  pub overrides_css: String,
  pub runtime: String,
}

impl Injections {
  /// Load `guard.js`, `overrides.css` and `runtime.js` from `dir`. Each file
  /// is required once a directory is configured.
  pub fn load(dir: &Path) -> Result<Self, MirrorError> {
    let read = |name: &str| {
      let path = dir.join(name);
      match fs::read_to_string(&path) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(MirrorError::MissingInjection(path)),
        Err(source) => Err(MirrorError::Read { path, source }),
      }
    };
    Ok(Self { guard: read(GUARD_FILE)?, overrides_css: read(OVERRIDES_FILE)?, runtime: read(RUNTIME_FILE)? })
  }
}

/// Everything one document render needs besides the snapshot itself.
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
  pub site: &'a Value,
  pub media: &'a BTreeMap<String, String>,
  pub injections: Option<&'a Injections>,
  pub static_prefix_from: &'a str,
  pub static_prefix_to: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
  pub html: String,
  pub report: PatchReport,
}

/// Read the captured snapshot. A missing file is fatal and names the command
/// that produces it.
pub fn read_snapshot(path: &Path) -> Result<String, MirrorError> {
  fs::read_to_string(path).map_err(|source| match source.kind() {
    ErrorKind::NotFound => MirrorError::MissingSnapshot(path.to_path_buf()),
    _ => MirrorError::Read { path: path.to_path_buf(), source },
  })
}

/// Load the site content object. A document with a `site` object yields that
/// object, any other document is used whole. Missing or unreadable content
/// falls back to `{}`.
pub fn load_site_content(path: &Path) -> Value {
  let empty = || Value::Object(serde_json::Map::new());
  let Ok(text) = fs::read_to_string(path) else {
    return empty();
  };
  match serde_json::from_str::<Value>(&text) {
    Ok(doc) => {
      if let Some(site) = doc.get("site").filter(|site| site.is_object()) {
        return site.clone();
      }
      if doc.is_object() { doc } else { empty() }
    }
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "site content is not valid JSON, using {{}}");
      empty()
    }
  }
}

/// Wrap the patched snapshot into a complete document: html and body
/// attributes carried over, static asset prefix rewritten, companion files and
/// the runtime globals injected into the head.
pub fn render_document(snapshot: &str, options: &RenderOptions<'_>) -> RenderedDocument {
  let mut html_attrs = html_open_re().find(snapshot).map(|m| parse_attrs(m.as_str(), "html")).unwrap_or_default();
  let mut body_attrs = body_open_re().find(snapshot).map(|m| parse_attrs(m.as_str(), "body")).unwrap_or_default();

  let lang = take_attr(&mut html_attrs, "lang").filter(|l| !l.is_empty()).unwrap_or_else(|| "en".to_string());
  let html_class = take_attr(&mut html_attrs, "class").unwrap_or_default();
  let body_class = take_attr(&mut body_attrs, "class").unwrap_or_default();

  let rewrite = |s: &str| {
    if options.static_prefix_from.is_empty() {
      s.to_string()
    } else {
      s.replace(options.static_prefix_from, options.static_prefix_to)
    }
  };
  let head = rewrite(inner(head_inner_re(), snapshot));
  let body = rewrite(inner(body_inner_re(), snapshot));

  let patched = apply_content_patches(&head, &body, options.site);

  let media = Value::Object(options.media.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect());
  let globals = format!(
    "window.__MIRROR_SITE_CONTENT__={};window.__MIRROR_MEDIA_MAP__={};",
    inline_script_json(options.site),
    inline_script_json(&media)
  );

  let class_attr = |class: &str| if class.is_empty() { String::new() } else { format!(" class=\"{}\"", escape_html(class)) };
  let (guard, style, runtime) = match options.injections {
    Some(inj) => (
      format!("<script>{}</script>", inj.guard),
      format!("<style>{}</style>", inj.overrides_css),
      format!("<script>{}</script>", inj.runtime),
    ),
    None => Default::default(),
  };

  let html = format!(
    "<!DOCTYPE html><html lang=\"{lang}\"{html_class}{html_rest}><head>{guard}{head}{style}<script>{globals}</script>{runtime}</head><body{body_class}{body_rest}>{body}</body></html>",
    lang = escape_html(&lang),
    html_class = class_attr(&html_class),
    html_rest = render_attrs(&html_attrs),
    head = patched.head_inner,
    body_class = class_attr(&body_class),
    body_rest = render_attrs(&body_attrs),
    body = patched.body_inner,
  );
  RenderedDocument { html, report: patched.report }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const SNAPSHOT: &str = concat!(
    r#"<!DOCTYPE html><html lang="nl" class="font-sans &amp; more" data-theme="light" hidden>"#,
    r#"<head><meta charset="utf-8"/><link rel="stylesheet" href="/_next/static/css/a.css"/></head>"#,
    r#"<body class="antialiased" data-x="1"><main>hi</main><script src="/_next/static/chunks/b.js"></script></body></html>"#
  );

  fn options<'a>(site: &'a Value, media: &'a BTreeMap<String, String>, injections: Option<&'a Injections>) -> RenderOptions<'a> {
    RenderOptions {
      site,
      media,
      injections,
      static_prefix_from: DEFAULT_STATIC_PREFIX_FROM,
      static_prefix_to: DEFAULT_STATIC_PREFIX_TO,
    }
  }

  // -- parse_attrs --

  #[test]
  fn attrs_in_order_with_bare_names() {
    let attrs = parse_attrs(r#"<html lang="en" hidden data-a="x &quot;y&quot;">"#, "html");
    assert_eq!(
      attrs,
      vec![
        ("lang".to_string(), "en".to_string()),
        ("hidden".to_string(), String::new()),
        ("data-a".to_string(), "x \"y\"".to_string())
      ]
    );
  }

  // -- render_document --

  #[test]
  fn document_shape() {
    let site = json!({"businessName": "Acme"});
    let media = BTreeMap::from([("/api/media/file/a.png".to_string(), "/mirror_media/a.png".to_string())]);
    let injections = Injections { guard: "g()".into(), overrides_css: "a{}".into(), runtime: "r()".into() };
    let doc = render_document(SNAPSHOT, &options(&site, &media, Some(&injections)));

    assert!(doc.html.starts_with(
      r#"<!DOCTYPE html><html lang="nl" class="font-sans &amp; more" data-theme="light" hidden><head><script>g()</script><title>"#
    ));
    assert!(doc.html.contains(r#"href="/mirror_next/static/css/a.css""#));
    assert!(doc.html.contains(r#"<script src="/mirror_next/static/chunks/b.js"></script>"#));
    assert!(doc.html.contains(r#"<style>a{}</style><script>window.__MIRROR_SITE_CONTENT__={"businessName":"Acme"};window.__MIRROR_MEDIA_MAP__={"/api/media/file/a.png":"/mirror_media/a.png"};</script><script>r()</script></head>"#));
    assert!(doc.html.contains(r#"<body class="antialiased" data-x="1"><main>hi</main>"#));
    assert!(doc.html.ends_with("</body></html>"));
    assert!(!doc.html.contains("/_next/static/"));
  }

  #[test]
  fn defaults_without_html_attrs_or_injections() {
    let site = json!({});
    let media = BTreeMap::new();
    let doc = render_document("<html><head></head><body>x</body></html>", &options(&site, &media, None));
    assert!(doc.html.starts_with(r#"<!DOCTYPE html><html lang="en"><head><title>"#));
    assert!(doc.html.contains("<body>x</body>"));
    assert!(!doc.html.contains("<style>"));
  }

  #[test]
  fn globals_escape_lt() {
    let out = inline_script_json(&json!({"a": "</script>"}));
    assert_eq!(out, r#"{"a":"\u003c/script>"}"#);
  }

  // -- files --

  #[test]
  fn missing_snapshot_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_snapshot(&dir.path().join("live-index.html")).unwrap_err();
    assert!(matches!(err, MirrorError::MissingSnapshot(_)));
    assert!(err.to_string().contains("Run: npm run clone:live"));
  }

  #[test]
  fn injections_require_every_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(GUARD_FILE), " g() \n").unwrap();
    fs::write(dir.path().join(OVERRIDES_FILE), "a{}").unwrap();
    let err = Injections::load(dir.path()).unwrap_err();
    assert!(matches!(err, MirrorError::MissingInjection(ref p) if p.ends_with(RUNTIME_FILE)));

    fs::write(dir.path().join(RUNTIME_FILE), "r()").unwrap();
    let loaded = Injections::load(dir.path()).unwrap();
    assert_eq!(loaded.guard, "g()");
  }

  #[test]
  fn site_content_prefers_site_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mirror-content.json");
    fs::write(&path, r#"{"site": {"businessName": "Acme"}, "meta": 1}"#).unwrap();
    assert_eq!(load_site_content(&path), json!({"businessName": "Acme"}));

    fs::write(&path, r#"{"businessName": "Whole"}"#).unwrap();
    assert_eq!(load_site_content(&path), json!({"businessName": "Whole"}));

    fs::write(&path, "[1, 2").unwrap();
    assert_eq!(load_site_content(&path), json!({}));
    assert_eq!(load_site_content(&dir.path().join("missing.json")), json!({}));
  }
}
