/* src/server/engine/rust/src/sections/command_center.rs */

use std::sync::OnceLock;

use mirror_injector::{encode_script_value, patch_balanced_element_by_start_marker, patch_payload_window, set_attribute_in_tag};
use regex::Regex;

use super::{PatchContext, animate, patch_pricing_cta, replace_script_fields, replace_text, with_container};
use crate::content::{CommandCenterContent, SectionContent};

pub(crate) const SECTION: &str = "command-center";

const CONTAINER_MARKER: &str = r#"<div class="mb-[127px] lg:mb-[167px]">"#;
const HEADING_MARKER: &str = r#"<h2 class="font-450 text-center text-heading">"#;
const HEADING_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const HEADING_LINE2_MARKER: &str =
  r#"<em class="whitespace-pre-wrap font-victorSerif capitalize font-medium text-heading" aria-label="#;
const DESCRIPTION_MARKER: &str = r#"<p class="whitespace-pre-wrap text-grey-500 text-xl" aria-label="#;

const PAYLOAD_START: &str = r#"\"children\":\"Your Health Command Center,\""#;
const PAYLOAD_END: &str = r#"4b:[\"$\",\"div\",\"5\""#;
const APP_IMAGE_CLASS_TOKEN: &str = r#"\"className\":\"w-full lg:w-[301px] h-[673px] object-contain\""#;

fn app_image_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?i)<img\b[^>]*class="w-full lg:w-\[301px\] h-\[673px\] object-contain"[^>]*>"#).unwrap()
  })
}

pub(crate) fn patch_markup(markup: &str, center: &CommandCenterContent, ctx: &mut PatchContext) -> String {
  let defaults = CommandCenterContent::defaults();
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = patch_balanced_element_by_start_marker(section, HEADING_MARKER, "h2", |heading| {
      let heading = animate(heading, HEADING_LINE1_MARKER, "span", &center.heading_line1);
      animate(&heading, HEADING_LINE2_MARKER, "em", &center.heading_line2)
    });
    out = animate(&out, DESCRIPTION_MARKER, "p", &center.description);
    out = patch_pricing_cta(&out, &center.cta_label);
    out = replace_text(&out, &defaults.loading_animation_label, &center.loading_animation_label);
    app_image_re()
      .replace(&out, |caps: &regex::Captures| set_attribute_in_tag(&caps[0], "alt", &center.app_image_alt))
      .into_owned()
  })
}

/// The app image alt is written whether the snapshot carries the default alt
/// or an empty one.
pub(crate) fn patch_payload(payload: &str, center: &CommandCenterContent, ctx: &mut PatchContext) -> String {
  let d = CommandCenterContent::defaults();
  patch_payload_window(payload, PAYLOAD_START, Some(PAYLOAD_END), "command-center-section-flight", &mut ctx.log, |window| {
    let window = replace_script_fields(
      window,
      [
        ("children", d.heading_line1.as_str(), center.heading_line1.as_str()),
        ("children", d.heading_line2.as_str(), center.heading_line2.as_str()),
        ("children", d.loading_animation_label.as_str(), center.loading_animation_label.as_str()),
        ("children", d.description.as_str(), center.description.as_str()),
        ("children", d.cta_label.as_str(), center.cta_label.as_str()),
      ],
    );
    let alt_token = |alt: &str| format!(r#"\"alt\":\"{}\",{APP_IMAGE_CLASS_TOKEN}"#, encode_script_value(alt));
    let next = alt_token(&center.app_image_alt);
    window.replace(&alt_token(&d.app_image_alt), &next).replace(&alt_token(""), &next)
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn fixture() -> String {
    format!(
      r#"<section>{CONTAINER_MARKER}{HEADING_MARKER}{HEADING_LINE1_MARKER}"Your Health Command Center,"><span class="sr-only">Your Health Command Center,</span></span></h2><span>Loading animation...</span><a class="btn" href="/pricing" target="_blank"><span>Start With Geviti Today</span></a><img alt="" class="w-full lg:w-[301px] h-[673px] object-contain" src="/app.png"/></div></section>"#
    )
  }

  #[test]
  fn markup_slots() {
    let site = json!({
      "commandCenterSection": {
        "headingLine1": "Everything in one app,",
        "loadingAnimationLabel": "Loading...",
        "ctaLabel": "Book now",
        "appImageAlt": "Booking app"
      }
    });
    let mut ctx = PatchContext::new();
    let out = patch_markup(&fixture(), &CommandCenterContent::resolve(&site), &mut ctx);
    assert!(out.contains(r#"<span class="sr-only">Everything in one app,</span>"#));
    assert!(out.contains("<span>Loading...</span>"));
    assert!(out.contains(r#"<a class="btn" href="/pricing"><span>Book now</span></a>"#));
    assert!(out.contains(r#"<img alt="Booking app" class="w-full"#));
    assert!(out.ends_with("</div></section>"));
  }

  #[test]
  fn payload_window_and_empty_alt() {
    let payload = format!(
      r#"{PAYLOAD_START},{{\"children\":\"Start With Geviti Today\"}},{{\"alt\":\"\",{APP_IMAGE_CLASS_TOKEN}}}
{PAYLOAD_END},{{\"children\":\"Start With Geviti Today\"}}"#
    );
    let site = json!({"commandCenterSection": {"ctaLabel": "Book now", "appImageAlt": "Booking app"}});
    let mut ctx = PatchContext::new();
    let out = patch_payload(&payload, &CommandCenterContent::resolve(&site), &mut ctx);
    assert!(out.contains(r#"{\"children\":\"Book now\"},{\"alt\":\"Booking app\","#));
    assert!(out.ends_with(r#"{\"children\":\"Start With Geviti Today\"}"#));
    assert!(ctx.log.is_empty());
  }

  #[test]
  fn payload_without_window_warns() {
    let mut ctx = PatchContext::new();
    patch_payload("self.__next_f.push([1,\"\"])", &CommandCenterContent::defaults(), &mut ctx);
    assert_eq!(ctx.log.warnings(), ["[mirror slots] command-center-section-flight: start marker not found."]);
  }
}
