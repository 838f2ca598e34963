/* src/server/injector/rust/src/tag.rs */

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

use crate::escape::{escape_html, escape_regex};
use crate::log::SlotLog;

fn tag_close_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\s*/?>$").unwrap())
}

fn span_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<span\b[^>]*>).*?(</span>)").unwrap())
}

fn anchor_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)^<a\b[^>]*>").unwrap())
}

fn anchor_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)<a\b[^>]*>.*?</a>").unwrap())
}

fn attribute_re(attr: &str, leading_space: bool) -> Option<Regex> {
  let lead = if leading_space { r"\s+" } else { r"\b" };
  let name = escape_regex(attr);
  Regex::new(&format!(r#"(?i){lead}{name}\s*=\s*(?:"[^"]*"|'[^']*')"#)).ok()
}

/// Set `attr` on a single opening tag, replacing an existing quoted value or
/// appending before the closing `>` / `/>`. The value is HTML-escaped.
pub fn set_attribute_in_tag(tag: &str, attr: &str, value: &str) -> String {
  let rendered = format!("{attr}=\"{}\"", escape_html(value));
  let Some(re) = attribute_re(attr, false) else {
    return tag.to_string();
  };
  if re.is_match(tag) {
    return re.replace(tag, NoExpand(&rendered)).into_owned();
  }
  tag_close_re().replace(tag, |caps: &regex::Captures| format!(" {rendered}{}", &caps[0])).into_owned()
}

/// Remove every quoted occurrence of `attr` from an opening tag.
pub fn remove_attribute_from_tag(tag: &str, attr: &str) -> String {
  match attribute_re(attr, true) {
    Some(re) => re.replace_all(tag, "").into_owned(),
    None => tag.to_string(),
  }
}

/// Read a double-quoted attribute value from an opening tag.
pub fn read_attribute<'a>(tag: &'a str, attr: &str) -> Option<&'a str> {
  let re = Regex::new(&format!(r#"(?i)\b{}\s*=\s*"([^"]*)""#, escape_regex(attr))).ok()?;
  re.captures(tag).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Replace the text of the first `<span>` in `inner`, or the whole inner HTML
/// when there is no span.
pub fn patch_first_span_text(inner: &str, label: &str) -> String {
  let escaped = escape_html(label);
  if !span_re().is_match(inner) {
    return escaped;
  }
  span_re()
    .replace(inner, |caps: &regex::Captures| format!("{}{escaped}{}", &caps[1], &caps[2]))
    .into_owned()
}

/// New label, destination and target for one anchor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnchorUpdate {
  pub label: String,
  pub href: String,
  pub new_tab: bool,
}

impl AnchorUpdate {
  pub fn new(label: impl Into<String>, href: impl Into<String>, new_tab: bool) -> Self {
    Self { label: label.into(), href: href.into(), new_tab }
  }
}

/// Rewrite one `<a ...>...</a>` element: href (empty becomes `#`), target/rel
/// for new-tab links, and the label in its first span.
pub fn patch_anchor_node(anchor: &str, update: &AnchorUpdate) -> String {
  let Some(open) = anchor_open_re().find(anchor) else {
    return anchor.to_string();
  };
  let close = "</a>";
  if !anchor.ends_with(close) || anchor.len() < open.end() + close.len() {
    return anchor.to_string();
  }

  let href = if update.href.is_empty() { "#" } else { update.href.as_str() };
  let mut open_tag = set_attribute_in_tag(open.as_str(), "href", href);
  if update.new_tab {
    open_tag = set_attribute_in_tag(&open_tag, "target", "_blank");
    open_tag = set_attribute_in_tag(&open_tag, "rel", "noopener noreferrer");
  } else {
    open_tag = remove_attribute_from_tag(&open_tag, "target");
    open_tag = remove_attribute_from_tag(&open_tag, "rel");
  }

  let inner = &anchor[open.end()..anchor.len() - close.len()];
  format!("{open_tag}{}{close}", patch_first_span_text(inner, &update.label))
}

/// Apply `updates[i]` to the i-th anchor in `section`. Extra anchors are left
/// alone; missing anchors are reported under `slot`.
pub fn patch_anchors_by_index(section: &str, updates: &[AnchorUpdate], slot: &str, log: &mut SlotLog) -> String {
  if updates.is_empty() {
    return section.to_string();
  }

  let mut out = String::with_capacity(section.len());
  let mut cursor = 0;
  let mut found = 0;
  for m in anchor_re().find_iter(section) {
    out.push_str(&section[cursor..m.start()]);
    match updates.get(found) {
      Some(update) => out.push_str(&patch_anchor_node(m.as_str(), update)),
      None => out.push_str(m.as_str()),
    }
    cursor = m.end();
    found += 1;
  }
  out.push_str(&section[cursor..]);

  if found < updates.len() {
    log.warn(
      slot,
      format!("expected at least {} anchors but found {found}. Skipping missing slots.", updates.len()),
    );
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  // -- set_attribute_in_tag --

  #[test]
  fn set_attribute_replaces_existing() {
    let tag = r#"<a class="btn" HREF='/old'>"#;
    assert_eq!(set_attribute_in_tag(tag, "href", "/new"), r#"<a class="btn" href="/new">"#);
  }

  #[test]
  fn set_attribute_appends_when_absent() {
    assert_eq!(set_attribute_in_tag(r#"<a class="btn">"#, "target", "_blank"), r#"<a class="btn" target="_blank">"#);
  }

  #[test]
  fn set_attribute_before_self_closing() {
    assert_eq!(set_attribute_in_tag(r#"<img src="a.png" />"#, "alt", "x"), r#"<img src="a.png" alt="x" />"#);
  }

  #[test]
  fn set_attribute_escapes_value() {
    assert_eq!(set_attribute_in_tag("<a>", "title", "\"Tom & Jerry\""), r#"<a title="&quot;Tom &amp; Jerry&quot;">"#);
  }

  #[test]
  fn set_attribute_value_with_dollar_is_literal() {
    assert_eq!(set_attribute_in_tag(r#"<a href="x">"#, "href", "$1"), r#"<a href="$1">"#);
  }

  // -- remove_attribute_from_tag --

  #[test]
  fn remove_attribute_all_occurrences() {
    let tag = r#"<a href="/" target="_blank" rel="noopener" TARGET='x'>"#;
    assert_eq!(remove_attribute_from_tag(tag, "target"), r#"<a href="/" rel="noopener">"#);
  }

  #[test]
  fn read_attribute_value() {
    assert_eq!(read_attribute(r#"<a class="x" href="/pricing">"#, "href"), Some("/pricing"));
    assert_eq!(read_attribute("<a>", "href"), None);
  }

  // -- first span --

  #[test]
  fn first_span_text_replaced() {
    let inner = r#"<span class="a">Old</span><span>Keep</span>"#;
    assert_eq!(patch_first_span_text(inner, "New & better"), r#"<span class="a">New &amp; better</span><span>Keep</span>"#);
  }

  #[test]
  fn first_span_absent_replaces_all() {
    assert_eq!(patch_first_span_text("plain <b>x</b>", "<Call>"), "&lt;Call&gt;");
  }

  // -- patch_anchor_node --

  #[test]
  fn anchor_new_tab_adds_target_and_rel() {
    let anchor = r#"<a class="btn" href="/pricing"><span>Join</span></a>"#;
    let update = AnchorUpdate::new("WhatsApp", "https://wa.me/31600000000", true);
    assert_eq!(
      patch_anchor_node(anchor, &update),
      r#"<a class="btn" href="https://wa.me/31600000000" target="_blank" rel="noopener noreferrer"><span>WhatsApp</span></a>"#
    );
  }

  #[test]
  fn anchor_same_tab_strips_target_and_rel() {
    let anchor = r#"<a href="/x" target="_blank" rel="noopener"><span>A</span></a>"#;
    let update = AnchorUpdate::new("B", "/y", false);
    assert_eq!(patch_anchor_node(anchor, &update), r#"<a href="/y"><span>B</span></a>"#);
  }

  #[test]
  fn anchor_empty_href_becomes_hash() {
    let anchor = r#"<a href="/x">Old</a>"#;
    assert_eq!(patch_anchor_node(anchor, &AnchorUpdate::new("New", "", false)), r##"<a href="#">New</a>"##);
  }

  #[test]
  fn anchor_not_closed_is_unchanged() {
    let anchor = r#"<a href="/x">Old"#;
    assert_eq!(patch_anchor_node(anchor, &AnchorUpdate::new("New", "/y", false)), anchor);
  }

  // -- patch_anchors_by_index --

  #[test]
  fn anchors_by_index_patches_in_order() {
    let section = r#"<nav><a href="/1">One</a> | <a href="/2">Two</a> | <a href="/3">Three</a></nav>"#;
    let updates = vec![AnchorUpdate::new("A", "/a", false), AnchorUpdate::new("B", "/b", false)];
    let mut log = SlotLog::new();
    let out = patch_anchors_by_index(section, &updates, "header-nav", &mut log);
    assert_eq!(out, r#"<nav><a href="/a">A</a> | <a href="/b">B</a> | <a href="/3">Three</a></nav>"#);
    assert!(log.is_empty());
  }

  #[test]
  fn anchors_by_index_warns_on_shortfall() {
    let section = r#"<a href="/1">One</a>"#;
    let updates = vec![AnchorUpdate::new("A", "/a", false), AnchorUpdate::new("B", "/b", false)];
    let mut log = SlotLog::new();
    let out = patch_anchors_by_index(section, &updates, "header-nav", &mut log);
    assert_eq!(out, r#"<a href="/a">A</a>"#);
    assert_eq!(
      log.warnings(),
      ["[mirror slots] header-nav: expected at least 2 anchors but found 1. Skipping missing slots."]
    );
  }

  #[test]
  fn anchors_by_index_no_updates_is_identity() {
    let mut log = SlotLog::new();
    assert_eq!(patch_anchors_by_index("<a>x</a>", &[], "s", &mut log), "<a>x</a>");
  }
}
