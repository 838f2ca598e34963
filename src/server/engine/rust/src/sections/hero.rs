/* src/server/engine/rust/src/sections/hero.rs */

use super::{PatchContext, animate, patch_pricing_cta, replace_script_values, with_container};
use crate::content::{HeroContent, SectionContent};

pub(crate) const SECTION: &str = "hero";

pub(crate) const CONTAINER_MARKER: &str =
  r#"<div class="relative safe-h-screen flex items-end justify-center text-white overflow-hidden" data-theme="dark">"#;
const TITLE_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const TITLE_LINE2_MARKER: &str =
  r#"<em class="whitespace-pre-wrap text-skyBlue font-victorSerif font-medium text-[35px]/[46px] lg:text-[80px]/[105px]""#;
const DESCRIPTION_MARKER: &str = r#"<p class="whitespace-pre-wrap text-sm max-lg:max-w-[271px] lg:text-xl mt-6 font-light""#;

pub(crate) fn patch_markup(markup: &str, hero: &HeroContent, ctx: &mut PatchContext) -> String {
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let mut out = animate(section, TITLE_LINE1_MARKER, "span", &hero.title_line1);
    out = animate(&out, TITLE_LINE2_MARKER, "em", &hero.title_line2);
    out = animate(&out, DESCRIPTION_MARKER, "p", &hero.description);
    patch_pricing_cta(&out, &hero.primary_cta_label)
  })
}

pub(crate) fn patch_payload(payload: &str, hero: &HeroContent, _ctx: &mut PatchContext) -> String {
  let defaults = HeroContent::defaults();
  replace_script_values(
    payload,
    [
      (defaults.title_line1.as_str(), hero.title_line1.as_str()),
      (defaults.title_line2.as_str(), hero.title_line2.as_str()),
      (defaults.description.as_str(), hero.description.as_str()),
      (defaults.primary_cta_label.as_str(), hero.primary_cta_label.as_str()),
    ],
  )
}
