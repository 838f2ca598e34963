/* src/server/engine/rust/src/sections/trust.rs */

use mirror_injector::patch_balanced_element_by_start_marker;

use super::{PatchContext, animate, replace_script_values, with_container};
use crate::content::{SectionContent, TrustSectionContent};
use crate::copy::replace_flexible;

pub(crate) const SECTION: &str = "trust";

const CONTAINER_MARKER: &str = r#"<div class="mb-[78px] lg:mb-[263px] mt-[87px] lg:mt-[188px]">"#;
const HEADING_MARKER: &str = r#"<h2 class="capitalize font-450 whitespace-nowrap text-heading">"#;
const HEADING_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const HEADING_LINE2_MARKER: &str =
  r#"<em class="whitespace-pre-wrap font-victorSerif font-medium italic text-heading" aria-label="#;

/// `(default, next)` text pairs for labels and both card lists, in card order.
fn replacement_pairs(next: &TrustSectionContent, defaults: &TrustSectionContent) -> Vec<(String, String)> {
  let mut pairs = vec![
    (defaults.member_label.clone(), next.member_label.clone()),
    (defaults.read_more_label.clone(), next.read_more_label.clone()),
  ];

  for (default, card) in defaults.video_cards.iter().zip(&next.video_cards) {
    pairs.push((default.thumbnail_alt.clone(), card.thumbnail_alt.clone()));
    pairs.push((default.profile_alt.clone(), card.profile_alt.clone()));
    pairs.push((default.handle.clone(), card.handle.clone()));
    pairs.push((default.meta.clone(), card.meta.clone()));
    pairs.push((format!("Play video by {}", default.handle), format!("Play video by {}", card.handle)));
    pairs.push((format!("Video player for {}", default.handle), format!("Video player for {}", card.handle)));
  }

  for (default, card) in defaults.text_cards.iter().zip(&next.text_cards) {
    pairs.push((default.profile_alt.clone(), card.profile_alt.clone()));
    pairs.push((default.name.clone(), card.name.clone()));
    pairs.push((default.quote.clone(), card.quote.clone()));
  }

  pairs
}

pub(crate) fn patch_markup(markup: &str, trust: &TrustSectionContent, ctx: &mut PatchContext) -> String {
  let defaults = TrustSectionContent::defaults();
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, _| {
    let out = patch_balanced_element_by_start_marker(section, HEADING_MARKER, "h2", |heading| {
      let heading = animate(heading, HEADING_LINE1_MARKER, "span", &trust.heading_line1);
      animate(&heading, HEADING_LINE2_MARKER, "em", &trust.heading_line2)
    });
    replacement_pairs(trust, &defaults)
      .iter()
      .filter(|(from, to)| from != to)
      .fold(out, |acc, (from, to)| replace_flexible(&acc, from, to))
  })
}

/// Longer sources go first so a handle never clobbers the alt text that
/// contains it. Each pair is also tried with a trailing newline.
pub(crate) fn patch_payload(payload: &str, trust: &TrustSectionContent, _ctx: &mut PatchContext) -> String {
  let defaults = TrustSectionContent::defaults();
  let mut pairs = vec![
    (defaults.heading_line1.clone(), trust.heading_line1.clone()),
    (defaults.heading_line2.clone(), trust.heading_line2.clone()),
  ];
  pairs.extend(replacement_pairs(trust, &defaults));
  pairs.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

  pairs.iter().fold(payload.to_string(), |acc, (from, to)| {
    let acc = replace_script_values(&acc, [(from.as_str(), to.as_str())]);
    replace_script_values(&acc, [(format!("{from}\n").as_str(), format!("{to}\n").as_str())])
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn fixture() -> String {
    format!(
      r#"{CONTAINER_MARKER}{HEADING_MARKER}{HEADING_LINE1_MARKER}"Thousands trust geviti"><span class="sr-only">Thousands trust geviti</span></span> {HEADING_LINE2_MARKER}"with their health"><span class="sr-only">with their health</span></em></h2><img alt="Thumbnail for @realalexclark"/><button aria-label="Play video by @realalexclark"></button><p>@realalexclark</p><p>Verified   Geviti
 Member</p><p>Mark L.</p></div>"#
    )
  }

  #[test]
  fn markup_heading_and_pairs() {
    let site = json!({
      "trustSection": {
        "headingLine1": "Neighbours trust us",
        "memberLabel": "Happy customer",
        "videoCards": [{"handle": "@jan", "thumbnailAlt": "Thumbnail for @jan"}],
        "textCards": [{"name": "Anna K."}]
      }
    });
    let mut ctx = PatchContext::new();
    let out = patch_markup(&fixture(), &TrustSectionContent::resolve(&site), &mut ctx);
    assert!(out.contains(r#"aria-label="Neighbours trust us""#));
    assert!(out.contains(r#"<span class="sr-only">Neighbours trust us</span>"#));
    assert!(out.contains(r#"<img alt="Thumbnail for @jan"/>"#));
    assert!(out.contains(r#"aria-label="Play video by @jan""#));
    assert!(out.contains("<p>@jan</p>"));
    assert!(out.contains("<p>Happy customer</p>"));
    assert!(out.contains("<p>Anna K.</p>"));
    assert_eq!(ctx.matched, vec![SECTION]);
  }

  #[test]
  fn missing_container_warns() {
    let mut ctx = PatchContext::new();
    let out = patch_markup("<main></main>", &TrustSectionContent::defaults(), &mut ctx);
    assert_eq!(out, "<main></main>");
    assert_eq!(ctx.log.warnings(), ["[mirror slots] trust: container not found."]);
  }

  #[test]
  fn payload_longest_first() {
    let payload = r#"[\"alt\":\"Thumbnail for @realalexclark\",\"children\":\"@realalexclark\",\"children\":\"Read More\\n\"]"#;
    let site = json!({"trustSection": {"readMoreLabel": "Lees meer", "videoCards": [{"handle": "@jan", "thumbnailAlt": "Preview"}]}});
    let mut ctx = PatchContext::new();
    let out = patch_payload(payload, &TrustSectionContent::resolve(&site), &mut ctx);
    assert_eq!(out, r#"[\"alt\":\"Preview\",\"children\":\"@jan\",\"children\":\"Lees meer\\n\"]"#);
  }
}
