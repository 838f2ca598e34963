/* src/server/engine/rust/src/sections/newsletter.rs */

use std::sync::OnceLock;

use mirror_injector::{AnchorUpdate, patch_balanced_element_by_start_marker, set_attribute_in_tag};
use regex::Regex;

use super::{
  PatchContext, animate, patch_block_component, patch_pricing_anchor, replace_markup_media, with_container,
  write_children, write_cta, write_image,
};
use crate::content::{NewsletterContent, SectionContent};

pub(crate) const SECTION: &str = "newsletter";

const CONTAINER_MARKER: &str = r#"<div class="mt-0 mb-0">"#;
const HEADING_MARKER: &str = r#"<h2 class="text-[7.96vw]/[46px] xs:text-[32px]/[46px] lg:text-[64px]/[92px] font-550">"#;
const HEADING_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const HEADING_LINE2_MARKER: &str =
  r#"<em class="whitespace-pre-wrap font-victorSerif leading-[42px] lg:leading-[84px] font-medium" aria-label="#;
const DESCRIPTION_MARKER: &str = r#"<p class="whitespace-pre-wrap text-sm/[141%] sm:text-xl lg:text-2xl"#;

fn background_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)<img\b[^>]*class="w-full h-\[625px\] lg:h-\[847px\] object-cover"[^>]*>"#).unwrap())
}

pub(crate) fn patch_markup(markup: &str, newsletter: &NewsletterContent, ctx: &mut PatchContext) -> String {
  let defaults = NewsletterContent::defaults();
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = background_re()
      .replace(section, |caps: &regex::Captures| {
        let tag = set_attribute_in_tag(&caps[0], "alt", &newsletter.background_image_alt);
        set_attribute_in_tag(&tag, "src", &newsletter.background_image_path)
      })
      .into_owned();
    out = replace_markup_media(&out, &defaults.background_image_path, &newsletter.background_image_path);

    out = patch_balanced_element_by_start_marker(&out, HEADING_MARKER, "h2", |heading| {
      let heading = animate(heading, HEADING_LINE1_MARKER, "span", &newsletter.heading_line1);
      animate(&heading, HEADING_LINE2_MARKER, "em", &newsletter.heading_line2)
    });
    out = animate(&out, DESCRIPTION_MARKER, "p", &newsletter.description);
    patch_pricing_anchor(&out, |_| AnchorUpdate::new(newsletter.cta_label.as_str(), newsletter.cta_href.as_str(), false))
  })
}

pub(crate) fn patch_payload(payload: &str, newsletter: &NewsletterContent, ctx: &mut PatchContext) -> String {
  let d = NewsletterContent::defaults();
  patch_block_component(payload, "Newsletter", "newsletter-section-flight", &mut ctx.log, |line| {
    write_image(line, &d.background_image_path, &newsletter.background_image_path, &newsletter.background_image_alt);
    write_children(line, &d.heading_line1, &newsletter.heading_line1);
    write_children(line, &d.heading_line2, &newsletter.heading_line2);
    write_children(line, &d.description, &newsletter.description);
    write_cta(
      line,
      "!bg-transparent",
      (d.cta_label.as_str(), d.cta_href.as_str()),
      (newsletter.cta_label.as_str(), newsletter.cta_href.as_str()),
    );
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use mirror_injector::{CHUNK_END, CHUNK_START, decode_json_fragment, encode_json_fragment};
  use serde_json::{Value, json};

  #[test]
  fn markup_background_heading_cta() {
    let markup = format!(
      r#"{CONTAINER_MARKER}<picture><source srcset="/api/media/file/woman%20newsletter.jpg"/><img alt="Newsletter Background" class="w-full h-[625px] lg:h-[847px] object-cover" src="/api/media/file/woman%20newsletter.jpg"/></picture>{HEADING_MARKER}{HEADING_LINE1_MARKER}"Ready to experience"><span class="sr-only">Ready to experience</span></span></h2><a href="/pricing" target="_blank"><span>Join Today</span></a></div>"#
    );
    let site = json!({
      "newsletterSection": {
        "backgroundImagePath": "/media/van.jpg",
        "backgroundImageAlt": "Our van",
        "headingLine1": "Need a plumber?",
        "ctaLabel": "Message us",
        "ctaHref": "https://wa.me/31642869931"
      }
    });
    let mut ctx = PatchContext::new();
    let out = patch_markup(&markup, &NewsletterContent::resolve(&site), &mut ctx);
    assert!(out.contains(r#"<source srcset="/media/van.jpg"/>"#));
    assert!(out.contains(r#"<img alt="Our van" class="w-full h-[625px] lg:h-[847px] object-cover" src="/media/van.jpg"/>"#));
    assert!(out.contains(r#"aria-label="Need a plumber?""#));
    assert!(out.contains(r#"<a href="https://wa.me/31642869931"><span>Message us</span></a>"#));
  }

  #[test]
  fn payload_nodes() {
    let module = "blocks/RenderBlocks.tsx -> @/blocks/Newsletter/Component";
    let tree = json!([
      ["$", "img", null, {"src": "/api/media/file/woman%20newsletter.jpg", "alt": "Newsletter Background"}],
      ["$", "h2", null, {"children": "Ready to experience"}],
      ["$", "a", null, {"href": "/pricing", "className": "btn !bg-transparent", "children":
        ["$", "span", null, {"className": "inline align-middle", "children": "Join Today"}]}]
    ]);
    let chunk = format!("9:{{\"moduleIds\":[\"{module}\"],\"tree\":{tree}}}\n");
    let payload = format!("{CHUNK_START}{}{CHUNK_END}", encode_json_fragment(&chunk));
    let site = json!({"newsletterSection": {"backgroundImageAlt": "Our van", "headingLine1": "Need a plumber?", "ctaLabel": "Message us"}});
    let mut ctx = PatchContext::new();
    let out = patch_payload(&payload, &NewsletterContent::resolve(&site), &mut ctx);

    let body = &out[CHUNK_START.len()..out.len() - CHUNK_END.len()];
    let decoded = decode_json_fragment(body).unwrap();
    let tree_line = decoded.lines().find(|l| l.starts_with("9:")).unwrap();
    let line: Value = serde_json::from_str(&tree_line[2..]).unwrap();
    let tree = &line["tree"];
    assert_eq!(tree[0][3]["alt"], "Our van");
    assert_eq!(tree[0][3]["src"], "/api/media/file/woman%20newsletter.jpg");
    assert_eq!(tree[1][3]["children"], "Need a plumber?");
    assert_eq!(tree[2][3]["href"], "/pricing");
    assert_eq!(tree[2][3]["children"][3]["children"], "Message us");
    assert!(ctx.log.is_empty());
  }
}
