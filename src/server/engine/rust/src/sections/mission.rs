/* src/server/engine/rust/src/sections/mission.rs */

use std::sync::OnceLock;

use mirror_injector::{AnchorUpdate, patch_balanced_element_by_start_marker, set_attribute_in_tag};
use regex::Regex;

use super::{
  PatchContext, animate, patch_block_component, patch_pricing_anchor, replace_between, replace_markup_media,
  with_container, write_children, write_cta, write_image,
};
use crate::content::{MissionContent, MissionSectionContent, SectionContent};

pub(crate) const SECTION: &str = "mission";

const CONTAINER_MARKER: &str = r#"<div class="mt-[76px] lg:mt-[188px] mb-[87px] lg:mb-[188px]">"#;
const HEADING_MARKER: &str = r#"<h2 class="font-450 text-heading">"#;
const HEADING_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const HEADING_LINE2_MARKER: &str = r#"<em class="whitespace-pre-wrap font-victorSerif font-medium"#;
const DESCRIPTION_MARKER: &str = r#"<p class="whitespace-pre-wrap text-grey-500"#;

fn portrait_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)<img\b[^>]*class="w-full lg:w-\[519px\] h-\[544px\] object-cover"[^>]*>"#).unwrap())
}

fn name_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)(<h3 class="mt-5 text-balticSea text-xl">).*?(</h3>)"#).unwrap())
}

fn role_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)(<p class="text-grey-500 italic font-medium font-victorSerif text-xl">).*?(</p>)"#).unwrap())
}

pub(crate) fn patch_markup(markup: &str, content: &MissionSectionContent, ctx: &mut PatchContext) -> String {
  let mission = &content.mission;
  let defaults = MissionSectionContent::defaults().mission;
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = portrait_re()
      .replace(section, |caps: &regex::Captures| {
        let tag = set_attribute_in_tag(&caps[0], "alt", &mission.image_alt);
        set_attribute_in_tag(&tag, "src", &mission.image_path)
      })
      .into_owned();
    out = replace_markup_media(&out, &defaults.image_path, &mission.image_path);
    out = replace_between(&out, name_re(), &mission.name);
    out = replace_between(&out, role_re(), &mission.role);

    out = patch_balanced_element_by_start_marker(&out, HEADING_MARKER, "h2", |heading| {
      let heading = animate(heading, HEADING_LINE1_MARKER, "span", &mission.heading_line1);
      animate(&heading, HEADING_LINE2_MARKER, "em", &mission.heading_line2)
    });
    out = animate(&out, DESCRIPTION_MARKER, "p", &mission.description);
    patch_pricing_anchor(&out, |_| AnchorUpdate::new(mission.cta_label.as_str(), mission.cta_href.as_str(), false))
  })
}

/// Payload nodes are located by their default values, not by position.
pub(crate) fn patch_payload(payload: &str, content: &MissionSectionContent, ctx: &mut PatchContext) -> String {
  let next: &MissionContent = &content.mission;
  let d = MissionSectionContent::defaults().mission;
  patch_block_component(payload, "Team", "mission-section-flight", &mut ctx.log, |line| {
    write_image(line, &d.image_path, &next.image_path, &next.image_alt);
    write_children(line, &d.name, &next.name);
    write_children(line, &d.role, &next.role);
    write_children(line, &d.heading_line1, &next.heading_line1);
    write_children(line, &d.heading_line2, &next.heading_line2);
    write_children(line, &d.description, &next.description);
    write_cta(line, "shadow-buttonred", (d.cta_label.as_str(), d.cta_href.as_str()), (next.cta_label.as_str(), next.cta_href.as_str()));
  })
}
