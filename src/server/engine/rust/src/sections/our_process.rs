/* src/server/engine/rust/src/sections/our_process.rs */

use std::sync::OnceLock;

use mirror_injector::{
  encode_script_value, escape_html, patch_balanced_element_by_start_marker, patch_payload_window,
  set_attribute_in_tag,
};
use regex::Regex;

use super::{PatchContext, replace_between, replace_each, replace_script_fields, with_container_before};
use crate::content::{OurProcessContent, SectionContent};

pub(crate) const SECTION: &str = "our-process";

const CONTAINER_MARKER: &str = r#"<div class="mt-24 lg:mt-30 mb-24 lg:mb-30">"#;
const HEADING_MARKER: &str = r#"<h3 class="text-4xl lg:text-[48px] font-450 capitalize mb-6 lg:mb-10">"#;

const PAYLOAD_START: &str = r#"\"heading\":\"How Does\""#;
const PAYLOAD_END: &str = r#"\"heading\":\"Choose Your Path\""#;

fn image_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?i)<img\b[^>]*class="rounded-\[14px\] absolute object-cover w-full h-full"[^>]*>"#).unwrap()
  })
}

fn heading_lead_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<h3\b[^>]*>).*?(<em\b[^>]*>)").unwrap())
}

fn heading_em_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<em\b[^>]*>).*?(</em>)").unwrap())
}

fn step_title_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?s)(<span class="text-2xl lg:text-\[36px\] font-400 capitalize ml-2 text-primary-blue-zodiac">).*?(</span>)"#)
      .unwrap()
  })
}

fn step_description_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?s)(<p class="font-400 text-grey-500 lg:text-xl text-lg">).*?(</p>)"#).unwrap())
}

pub(crate) fn patch_markup(markup: &str, process: &OurProcessContent, ctx: &mut PatchContext) -> String {
  with_container_before(markup, HEADING_MARKER, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = image_re()
      .replace(section, |caps: &regex::Captures| set_attribute_in_tag(&caps[0], "alt", &process.image_alt))
      .into_owned();

    out = patch_balanced_element_by_start_marker(&out, HEADING_MARKER, "h3", |heading| {
      let lead = escape_html(&process.heading_line1);
      let heading = heading_lead_re()
        .replace(heading, |caps: &regex::Captures| format!("{}{lead}<!-- --> {}", &caps[1], &caps[2]))
        .into_owned();
      replace_between(&heading, heading_em_re(), &process.heading_line2)
    });

    out = replace_each(&out, step_title_re(), |i, caps| {
      let step = process.steps.get(i)?;
      Some(format!("{}{}{}", &caps[1], escape_html(&step.title), &caps[2]))
    });
    replace_each(&out, step_description_re(), |i, caps| {
      let step = process.steps.get(i)?;
      Some(format!("{}{}{}", &caps[1], escape_html(&step.description), &caps[2]))
    })
  })
}

/// The image alt is written over either a `null` alt or the default one.
pub(crate) fn patch_payload(payload: &str, process: &OurProcessContent, ctx: &mut PatchContext) -> String {
  let d = OurProcessContent::defaults();
  patch_payload_window(payload, PAYLOAD_START, Some(PAYLOAD_END), "our-process-section-flight", &mut ctx.log, |window| {
    let mut window = replace_script_fields(
      window,
      [
        ("heading", d.heading_line1.as_str(), process.heading_line1.as_str()),
        ("headingItalic", d.heading_line2.as_str(), process.heading_line2.as_str()),
      ],
    );
    for (default, step) in d.steps.iter().zip(&process.steps) {
      window = replace_script_fields(
        &window,
        [
          ("title", default.title.as_str(), step.title.as_str()),
          ("description", default.description.as_str(), step.description.as_str()),
        ],
      );
    }

    let caption = r#",\"caption\":null"#;
    let next = format!(r#"\"alt\":\"{}\"{caption}"#, encode_script_value(&process.image_alt));
    let default = format!(r#"\"alt\":\"{}\"{caption}"#, encode_script_value(&d.image_alt));
    window.replace(&format!(r#"\"alt\":null{caption}"#), &next).replace(&default, &next)
  })
}
