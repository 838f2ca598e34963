/* src/server/engine/rust/src/sections/header.rs */

use mirror_injector::{decode_json_fragment, encode_json_fragment, find_balanced_symbol_range, patch_anchors_by_index};
use serde_json::{Value, json};

use super::{PatchContext, with_container};
use crate::content::HeaderContent;

pub(crate) const SECTION: &str = "header";

const DESKTOP_NAV_MARKER: &str = r#"<ul class=" flex items-center space-x-0 hidden lg:flex">"#;
const DESKTOP_CTA_MARKER: &str = r#"<div class="max-lg:hidden flex items-center gap-4">"#;
const HEADER_TYPE_TOKEN: &str = r#"\"globalType\":\"header\""#;
const HEADER_DATA_TOKEN: &str = r#"\"data\":{"#;

pub(crate) fn patch_markup(markup: &str, header: &HeaderContent, ctx: &mut PatchContext) -> String {
  let mut out = markup.to_string();

  // The desktop nav list holds no nested <ul>, so the first close ends it.
  if let Some(start) = out.find(DESKTOP_NAV_MARKER) {
    let inner_start = start + DESKTOP_NAV_MARKER.len();
    if let Some(inner_end) = out[inner_start..].find("</ul>").map(|i| i + inner_start) {
      let patched = patch_anchors_by_index(&out[inner_start..inner_end], &header.nav_items, "desktop-nav", &mut ctx.log);
      out = format!("{}{patched}{}", &out[..inner_start], &out[inner_end..]);
    }
  }

  let ctas = [header.primary_cta.clone(), header.secondary_cta.clone()];
  with_container(&out, DESKTOP_CTA_MARKER, "div", SECTION, ctx, |section, ctx| {
    patch_anchors_by_index(section, &ctas, "desktop-cta", &mut ctx.log)
  })
}

/// Rewrite the header global's nav items and CTA links inside the escaped
/// `data` object. Runs only when the override supplies nav items.
pub(crate) fn patch_payload(payload: &str, header: &HeaderContent, _ctx: &mut PatchContext) -> String {
  if payload.is_empty() || header.nav_items.is_empty() {
    return payload.to_string();
  }
  patch_header_data(payload, header).unwrap_or_else(|| payload.to_string())
}

fn patch_header_data(payload: &str, header: &HeaderContent) -> Option<String> {
  let type_at = payload.find(HEADER_TYPE_TOKEN)?;
  let data_at = payload[..type_at].rfind(HEADER_DATA_TOKEN)?;
  let object_start = data_at + HEADER_DATA_TOKEN.len() - 1;
  let range = find_balanced_symbol_range(payload, object_start, '{', '}')?;

  let decoded = decode_json_fragment(range.slice(payload))?;
  let mut data: Value = serde_json::from_str(&decoded).ok()?;

  if let Some(nav) = data.get_mut("navItems").and_then(Value::as_array_mut) {
    for (entry, update) in nav.iter_mut().zip(&header.nav_items) {
      if let Some(entry) = entry.as_object_mut() {
        entry.insert("label".into(), json!(update.label));
        entry.insert("link".into(), json!(update.href));
      }
    }
  }

  let ctas = [&header.primary_cta, &header.secondary_cta];
  if let Some(links) = data.get_mut("links").and_then(Value::as_array_mut) {
    for (entry, update) in links.iter_mut().zip(ctas) {
      if let Some(link) = entry.get_mut("link").and_then(Value::as_object_mut) {
        link.insert("url".into(), json!(update.href));
        link.insert("label".into(), json!(update.label));
        link.insert("newTab".into(), json!(update.new_tab));
      }
    }
  }

  let encoded = encode_json_fragment(&serde_json::to_string(&data).ok()?);
  Some(format!("{}{encoded}{}", &payload[..range.start], &payload[range.end..]))
}

#[cfg(test)]
mod tests {
  use super::*;
  use mirror_injector::AnchorUpdate;

  fn header() -> HeaderContent {
    HeaderContent::resolve(&json!({
      "header": {"navItems": [{"label": "Services", "href": "/services"}, {"label": "Area", "href": "/area"}]}
    }))
  }

  #[test]
  fn markup_nav_and_ctas() {
    let markup = format!(
      r#"<header>{DESKTOP_NAV_MARKER}<li><a href="/a"><span>A</span></a></li><li><a href="/b"><span>B</span></a></li></ul>{DESKTOP_CTA_MARKER}<a href="/pricing"><span>Join</span></a><a href="/login" target="_blank"><span>Login</span></a></div></header>"#
    );
    let mut ctx = PatchContext::new();
    let out = patch_markup(&markup, &header(), &mut ctx);
    assert!(out.contains(r#"<a href="/services"><span>Services</span></a>"#));
    assert!(out.contains(r#"<a href="/area"><span>Area</span></a>"#));
    assert!(out.contains(
      r#"<a href="https://wa.me/31642869931" target="_blank" rel="noopener noreferrer"><span>WhatsApp</span></a>"#
    ));
    assert!(out.contains(r##"<a href="#free-quote"><span>Free Quote</span></a>"##));
    assert!(ctx.log.is_empty());
    assert_eq!(ctx.matched, vec![SECTION]);
  }

  #[test]
  fn markup_without_nav_overrides_leaves_nav() {
    let markup = format!(r#"{DESKTOP_NAV_MARKER}<a href="/a"><span>A</span></a></ul>"#);
    let mut ctx = PatchContext::new();
    let out = patch_markup(&markup, &HeaderContent::resolve(&json!({})), &mut ctx);
    assert!(out.starts_with(&markup));
    assert_eq!(ctx.log.warnings().iter().filter(|w| w.starts_with("[mirror slots] header")).count(), 1);
  }

  #[test]
  fn payload_rewrites_escaped_data_object() {
    let data = json!({
      "navItems": [{"label": "Old", "link": "/old", "id": 1}],
      "links": [{"link": {"url": "/x", "label": "X", "newTab": false}}, {"link": {"url": "/y", "label": "Y"}}]
    });
    let inner = serde_json::to_string(&json!({"data": data, "globalType": "header"})).unwrap();
    let payload = format!("<script>self.__next_f.push([1,\"{}\"])</script>", encode_json_fragment(&inner));

    let mut ctx = PatchContext::new();
    let out = patch_payload(&payload, &header(), &mut ctx);

    let body = out.strip_prefix("<script>self.__next_f.push([1,\"").unwrap().strip_suffix("\"])</script>").unwrap();
    let decoded: Value = serde_json::from_str(&decode_json_fragment(body).unwrap()).unwrap();
    assert_eq!(decoded["data"]["navItems"][0], json!({"label": "Services", "link": "/services", "id": 1}));
    assert_eq!(decoded["data"]["links"][0]["link"], json!({"url": "https://wa.me/31642869931", "label": "WhatsApp", "newTab": true}));
    assert_eq!(decoded["data"]["links"][1]["link"]["url"], json!("#free-quote"));
    assert_eq!(decoded["globalType"], json!("header"));
  }

  #[test]
  fn payload_untouched_without_nav_items() {
    let mut ctx = PatchContext::new();
    let header = HeaderContent {
      nav_items: Vec::new(),
      primary_cta: AnchorUpdate::default(),
      secondary_cta: AnchorUpdate::default(),
    };
    assert_eq!(patch_payload("anything", &header, &mut ctx), "anything");
  }
}
