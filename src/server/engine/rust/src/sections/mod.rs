/* src/server/engine/rust/src/sections/mod.rs */

pub(crate) mod biomarker;
pub(crate) mod choose_path;
pub(crate) mod command_center;
pub(crate) mod faq;
pub(crate) mod feature_panel;
pub(crate) mod footer;
pub(crate) mod gallery;
pub(crate) mod header;
pub(crate) mod hero;
pub(crate) mod mission;
pub(crate) mod newsletter;
pub(crate) mod our_process;
pub(crate) mod trust;

use std::sync::OnceLock;

use mirror_injector::{
  AnchorUpdate, Range, SlotLog, find_balanced_element_range, find_first_mut, patch_anchor_node,
  patch_animated_text_element, patch_balanced_element_by_start_marker, patch_chunk_by_needle, patch_chunk_lines,
  read_attribute, replace_escaped_script_string_value, replace_media_path, splice,
};
use regex::Regex;
use serde_json::{Map, Value};

/// Per-render state shared by the section patchers: the warning sink and the
/// names of sections whose container was located.
#[derive(Debug, Default)]
pub struct PatchContext {
  pub log: SlotLog,
  pub matched: Vec<&'static str>,
}

impl PatchContext {
  pub fn new() -> Self {
    Self::default()
  }

  fn mark(&mut self, section: &'static str) {
    if !self.matched.contains(&section) {
      self.matched.push(section);
    }
  }
}

/// Locate the balanced `tag` container starting at `marker`, hand it to `patch`
/// and splice the result back. A missing container warns once under `section`.
pub(crate) fn with_container<F>(
  markup: &str,
  marker: &str,
  tag: &str,
  section: &'static str,
  ctx: &mut PatchContext,
  patch: F,
) -> String
where
  F: FnOnce(&str, &mut PatchContext) -> String,
{
  let range = markup.find(marker).and_then(|start| find_balanced_element_range(markup, start, tag));
  let Some(range) = range else {
    ctx.log.warn(section, "container not found.");
    return markup.to_string();
  };
  ctx.mark(section);
  let patched = patch(range.slice(markup), ctx);
  splice(markup, range, &patched)
}

/// Like `with_container`, but the container is the nearest `marker` opening
/// before the first `anchor`, for wrappers whose class is shared by several
/// sections.
pub(crate) fn with_container_before<F>(
  markup: &str,
  anchor: &str,
  marker: &str,
  tag: &str,
  section: &'static str,
  ctx: &mut PatchContext,
  patch: F,
) -> String
where
  F: FnOnce(&str, &mut PatchContext) -> String,
{
  let range = markup
    .find(anchor)
    .and_then(|anchor_at| markup[..anchor_at].rfind(marker))
    .and_then(|start| find_balanced_element_range(markup, start, tag));
  let Some(range) = range else {
    ctx.log.warn(section, "container not found.");
    return markup.to_string();
  };
  ctx.mark(section);
  let patched = patch(range.slice(markup), ctx);
  splice(markup, range, &patched)
}

/// Run the animated-text rewrite on the element at `marker`.
pub(crate) fn animate(source: &str, marker: &str, tag: &str, text: &str) -> String {
  patch_balanced_element_by_start_marker(source, marker, tag, |el| patch_animated_text_element(el, text))
}

/// Global literal replacement, skipped when nothing changes.
pub(crate) fn replace_text(source: &str, from: &str, to: &str) -> String {
  if from.is_empty() || from == to {
    return source.to_string();
  }
  source.replace(from, to)
}

/// Escaped-string replacement for a list of `(default, next)` pairs.
pub(crate) fn replace_script_values<'a, I>(source: &str, pairs: I) -> String
where
  I: IntoIterator<Item = (&'a str, &'a str)>,
{
  pairs.into_iter().fold(source.to_string(), |acc, (from, to)| replace_escaped_script_string_value(&acc, from, to))
}

/// Escaped-string replacement of every encoding of a media path.
pub(crate) fn replace_script_media(source: &str, from: &str, to: &str) -> String {
  mirror_injector::build_media_path_replacement_pairs(from, to)
    .iter()
    .fold(source.to_string(), |acc, (f, t)| replace_escaped_script_string_value(&acc, f, t))
}

pub(crate) fn replace_markup_media(source: &str, from: &str, to: &str) -> String {
  replace_media_path(source, from, to)
}

fn pricing_anchor_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)<a\b[^>]*href="/pricing"[^>]*>.*?</a>"#).unwrap())
}

/// Every `<a href="/pricing">` anchor in `source`, as byte ranges.
pub(crate) fn pricing_anchors(source: &str) -> Vec<(usize, usize)> {
  pricing_anchor_re().find_iter(source).map(|m| (m.start(), m.end())).collect()
}

/// Relabel the first `/pricing` anchor, keeping its href.
pub(crate) fn patch_pricing_cta(section: &str, label: &str) -> String {
  patch_pricing_anchor(section, |anchor| {
    let href = read_attribute(anchor, "href").unwrap_or("/pricing");
    AnchorUpdate::new(label, href, false)
  })
}

/// Patch the first `/pricing` anchor with the update `f` builds from it.
pub(crate) fn patch_pricing_anchor<F>(section: &str, f: F) -> String
where
  F: FnOnce(&str) -> AnchorUpdate,
{
  let Some(&(start, end)) = pricing_anchors(section).first() else {
    return section.to_string();
  };
  let anchor = &section[start..end];
  splice(section, Range { start, end }, &patch_anchor_node(anchor, &f(anchor)))
}

/// Escaped `"field":"value"` replacement for a list of `(field, default, next)`.
pub(crate) fn replace_script_fields<'a, I>(source: &str, fields: I) -> String
where
  I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
{
  fields.into_iter().fold(source.to_string(), |acc, (field, from, to)| {
    mirror_injector::replace_escaped_script_field_value(&acc, field, from, to)
  })
}

/// Replace the text between capture groups 1 and 2 of the first match of `re`
/// with `text`, HTML-escaped.
pub(crate) fn replace_between(source: &str, re: &Regex, text: &str) -> String {
  let escaped = mirror_injector::escape_html(text);
  re.replace(source, |caps: &regex::Captures| format!("{}{escaped}{}", &caps[1], &caps[2])).into_owned()
}

/// Rewrite each match of `re` in order, handing `f` the match index and the
/// captures. `None` keeps the match as captured.
pub(crate) fn replace_each<F>(source: &str, re: &Regex, mut f: F) -> String
where
  F: FnMut(usize, &regex::Captures) -> Option<String>,
{
  let mut index = 0;
  re.replace_all(source, |caps: &regex::Captures| {
    let out = f(index, caps).unwrap_or_else(|| caps[0].to_string());
    index += 1;
    out
  })
  .into_owned()
}

fn img_alt_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)(<img\b[^>]*\balt=")[^"]*(")"#).unwrap())
}

fn first_span_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<span\b[^>]*>).*?(</span>)").unwrap())
}

fn first_em_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<em\b[^>]*>).*?(</em>)").unwrap())
}

fn first_anchor_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)<a\b[^>]*>.*?</a>").unwrap())
}

/// Set the `alt` of the first `<img>` in `source`.
pub(crate) fn set_first_img_alt(source: &str, alt: &str) -> String {
  replace_between(source, img_alt_re(), alt)
}

pub(crate) fn set_first_span_text(source: &str, text: &str) -> String {
  replace_between(source, first_span_re(), text)
}

pub(crate) fn set_first_em_text(source: &str, text: &str) -> String {
  replace_between(source, first_em_re(), text)
}

/// Patch the first anchor in `source`.
pub(crate) fn patch_first_anchor(source: &str, update: &AnchorUpdate) -> String {
  first_anchor_re().replace(source, |caps: &regex::Captures| patch_anchor_node(&caps[0], update)).into_owned()
}

// -- payload nodes --

/// Patch the payload line rendered by the `@/blocks/<component>/Component`
/// module. Every matching line counts as patched.
pub(crate) fn patch_block_component<F>(payload: &str, component: &str, slot: &str, log: &mut SlotLog, mut edit: F) -> String
where
  F: FnMut(&mut Value),
{
  let module = format!("blocks/RenderBlocks.tsx -> @/blocks/{component}/Component");
  let needle = format!(r#"\"moduleIds\":[\"{module}\"]"#);
  patch_chunk_by_needle(payload, &needle, slot, log, |chunk, log| {
    Some(patch_chunk_lines(chunk, &module, slot, log, |line, _| {
      edit(line);
      true
    }))
  })
}

fn str_member<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  node.get(key).and_then(Value::as_str)
}

/// Overwrite string members of the first object matching `pred`.
pub(crate) fn write_first<P>(payload: &mut Value, pred: P, fields: &[(&str, &str)]) -> bool
where
  P: Fn(&Map<String, Value>) -> bool,
{
  let found = find_first_mut(payload, &|node: &Value| node.as_object().is_some_and(&pred));
  let Some(node) = found.and_then(Value::as_object_mut) else {
    return false;
  };
  for (key, value) in fields {
    node.insert((*key).to_string(), Value::String((*value).to_string()));
  }
  true
}

/// Rewrite the first node whose `children` is exactly `from`.
pub(crate) fn write_children(payload: &mut Value, from: &str, to: &str) -> bool {
  write_first(payload, |node| str_member(node, "children") == Some(from), &[("children", to)])
}

/// Rewrite the first node whose `src` is `from`, setting `src` and `alt`.
pub(crate) fn write_image(payload: &mut Value, from: &str, src: &str, alt: &str) -> bool {
  write_first(payload, |node| str_member(node, "src") == Some(from), &[("src", src), ("alt", alt)])
}

/// CTA anchor (`href` plus a class fragment) and its `inline align-middle` label.
pub(crate) fn write_cta(payload: &mut Value, class_fragment: &str, defaults: (&str, &str), next: (&str, &str)) {
  let (default_label, default_href) = defaults;
  let (label, href) = next;
  write_first(
    payload,
    |node| {
      str_member(node, "href") == Some(default_href)
        && str_member(node, "className").is_some_and(|class| class.contains(class_fragment))
    },
    &[("href", href)],
  );
  write_first(
    payload,
    |node| str_member(node, "children") == Some(default_label) && str_member(node, "className") == Some("inline align-middle"),
    &[("children", label)],
  );
}
