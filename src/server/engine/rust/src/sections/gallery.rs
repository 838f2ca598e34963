/* src/server/engine/rust/src/sections/gallery.rs */

use std::sync::OnceLock;

use mirror_injector::{AnchorUpdate, escape_html, patch_balanced_element_by_start_marker};
use regex::Regex;

use super::{
  PatchContext, patch_block_component, patch_pricing_anchor, replace_between, replace_markup_media, replace_text,
  set_first_em_text, with_container, write_children, write_cta, write_first,
};
use crate::content::{MissionSectionContent, SectionContent};

pub(crate) const SECTION: &str = "gallery";

const CONTAINER_MARKER: &str = r#"<div class="mb-[78px] lg:mb-[123px] mt-[78px] lg:mt-[263px]">"#;
const HEADING_MARKER: &str = r#"<h2 class="font-450 text-heading">"#;

fn plain_span_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<span>).*?(</span>)").unwrap())
}

pub(crate) fn patch_markup(markup: &str, content: &MissionSectionContent, ctx: &mut PatchContext) -> String {
  let gallery = &content.gallery;
  let defaults = MissionSectionContent::defaults().gallery;
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = patch_balanced_element_by_start_marker(section, HEADING_MARKER, "h2", |heading| {
      set_first_em_text(&replace_between(heading, plain_span_re(), &gallery.heading_line1), &gallery.heading_line2)
    });
    out = patch_pricing_anchor(&out, |_| AnchorUpdate::new(gallery.cta_label.as_str(), gallery.cta_href.as_str(), false));

    for (default, image) in defaults.images.iter().zip(&gallery.images) {
      if default.alt != image.alt {
        out = replace_text(
          &out,
          &format!("alt=\"{}\"", escape_html(&default.alt)),
          &format!("alt=\"{}\"", escape_html(&image.alt)),
        );
      }
      out = replace_markup_media(&out, &default.image_path, &image.image_path);
    }
    out
  })
}

pub(crate) fn patch_payload(payload: &str, content: &MissionSectionContent, ctx: &mut PatchContext) -> String {
  let next = &content.gallery;
  let d = MissionSectionContent::defaults().gallery;
  patch_block_component(payload, "ImageGallery", "mission-gallery-section-flight", &mut ctx.log, |line| {
    write_children(line, &d.heading_line1, &next.heading_line1);
    write_children(line, &d.heading_line2, &next.heading_line2);
    write_cta(line, "!bg-transparent", (d.cta_label.as_str(), d.cta_href.as_str()), (next.cta_label.as_str(), next.cta_href.as_str()));
    for (default, image) in d.images.iter().zip(&next.images) {
      write_first(
        line,
        |node| {
          node.get("src").and_then(|v| v.as_str()) == Some(default.image_path.as_str())
            && node.get("alt").and_then(|v| v.as_str()) == Some(default.alt.as_str())
        },
        &[("src", image.image_path.as_str()), ("alt", image.alt.as_str())],
      );
    }
  })
}
