/* src/server/engine/rust/src/sections/biomarker.rs */

use mirror_injector::{
  AnchorUpdate, Replacement, patch_anchor_node, patch_balanced_element_by_start_marker, replace_ranges_by_offsets,
};

use super::{
  PatchContext, animate, pricing_anchors, replace_markup_media, replace_script_media, replace_script_values,
  replace_text, with_container,
};
use crate::content::{BiomarkerPanelContent, SectionContent};

pub(crate) const SECTION: &str = "biomarker-panel";

const CONTAINER_MARKER: &str = r#"<div class="mt-[52px] lg:mt-[110px] mb-[52px] lg:mb-[110px]">"#;
const HEADING_MARKER: &str = r#"<h2 class="font-450 text-heading-section">"#;
const TITLE_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const TITLE_LINE2_MARKER: &str = r#"<em class="whitespace-pre-wrap capitalize font-medium font-victorSerif text-heading-section""#;

pub(crate) fn patch_markup(markup: &str, panel: &BiomarkerPanelContent, ctx: &mut PatchContext) -> String {
  let defaults = BiomarkerPanelContent::defaults();
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = patch_balanced_element_by_start_marker(section, HEADING_MARKER, "h2", |heading| {
      let heading = animate(heading, TITLE_LINE1_MARKER, "span", &panel.title_line1);
      animate(&heading, TITLE_LINE2_MARKER, "em", &panel.title_line2)
    });

    // Only the CTAs still carrying the captured label belong to this slot.
    let edits: Vec<Replacement> = pricing_anchors(&out)
      .into_iter()
      .filter(|&(start, end)| out[start..end].contains(defaults.primary_cta_label.as_str()))
      .map(|(start, end)| Replacement {
        start,
        end,
        content: patch_anchor_node(&out[start..end], &AnchorUpdate::new(&panel.primary_cta_label, "/pricing", false)),
      })
      .collect();
    out = replace_ranges_by_offsets(&out, &edits);

    for (default_item, item) in defaults.items.iter().zip(&panel.items) {
      // Media first: decoded paths can contain the label text.
      out = replace_markup_media(&out, &default_item.image_path, &item.image_path);
      out = replace_text(&out, &default_item.label, &item.label);
    }
    out
  })
}

pub(crate) fn patch_payload(payload: &str, panel: &BiomarkerPanelContent, _ctx: &mut PatchContext) -> String {
  let defaults = BiomarkerPanelContent::defaults();
  let mut out = replace_script_values(
    payload,
    [
      (defaults.title_line1.as_str(), panel.title_line1.as_str()),
      (defaults.title_line2.as_str(), panel.title_line2.as_str()),
      (defaults.primary_cta_label.as_str(), panel.primary_cta_label.as_str()),
    ],
  );
  for (default_item, item) in defaults.items.iter().zip(&panel.items) {
    out = replace_script_media(&out, &default_item.image_path, &item.image_path);
    out = replace_script_values(&out, [(default_item.label.as_str(), item.label.as_str())]);
  }
  out
}
