/* src/server/engine/rust/src/sections/feature_panel.rs */

use std::sync::OnceLock;

use mirror_injector::{
  AnchorUpdate, Replacement, escape_html, find_balanced_element_ranges_by_start_marker,
  patch_balanced_element_by_start_marker, patch_payload_window, replace_escaped_script_field_value,
  replace_ranges_by_offsets,
};
use regex::Regex;

use super::{
  PatchContext, animate, patch_first_anchor, replace_each, replace_markup_media, replace_script_fields, replace_text,
  set_first_em_text, set_first_img_alt, set_first_span_text,
};
use crate::content::{FeatureCard, FeaturePanelContent, PrescriptionCard, SectionContent};

pub(crate) const SECTION: &str = "feature-panel";

const CONTAINER_MARKER: &str = r#"<div class="mt-[52px] lg:mt-[265px] mb-[63px] lg:mb-[198px]">"#;
const CARD_MARKER: &str =
  r#"<div class="relative shrink-0 w-[280px] max-lg:w-[80vw] overflow-hidden rounded-[14px] max-lg:last:mr-4">"#;
const CARD_TITLE_MARKER: &str = r#"<h3 class="text-[32px] relative z-10">"#;
const HEADING_MARKER: &str = r#"<h2 class="font-450 mb-4 lg:text-[36px] !leading-none text-heading-section">"#;
const HEADING_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const HEADING_LINE2_MARKER: &str =
  r#"<span class="whitespace-pre-wrap italic font-victorSerif font-medium lg:text-[36px] text-heading-section" aria-label="#;
const DESCRIPTION_MARKER: &str = r#"<p class="whitespace-pre-wrap text-muted-foreground mb-4.5 leading-relaxed""#;

const PRIMARY_WINDOW_START: &str = r#"\"src\":\"/api/media/file/Testing%20for%20home%20page.webp\""#;
const PRESCRIPTION_WINDOW_START: &str = r#"\"src\":\"/api/media/file/Longevity%20Rx%20for%20home%20page.webp\""#;
const PRESCRIPTION_WINDOW_END: &str = r#"\"src\":\"/api/media/file/Care%20team%20for%20home%20page.webp\""#;
const CARE_WINDOW_START: &str = r#"\"children\":\"Bye bye sick care,\""#;
const CARE_WINDOW_END: &str = r#"\"children\":\"Thousands trust geviti\""#;

fn stat_value_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"(?s)(<div class="italic text-\[80px\] font-medium text-blueZodiac font-victorSerif">)(.*?)(</div>)"#)
      .unwrap()
  })
}

fn stat_lines_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?s)(<div class="text-grey-500 text-2xl">).*?(</div>)"#).unwrap())
}

/// The slots a feature card and the prescription card share.
struct CardSlots<'a> {
  alt: &'a str,
  image_path: &'a str,
  title_line1: &'a str,
  title_line2: &'a str,
  href: &'a str,
}

impl<'a> From<&'a FeatureCard> for CardSlots<'a> {
  fn from(card: &'a FeatureCard) -> Self {
    Self {
      alt: &card.alt,
      image_path: &card.image_path,
      title_line1: &card.title_line1,
      title_line2: &card.title_line2,
      href: &card.href,
    }
  }
}

impl<'a> From<&'a PrescriptionCard> for CardSlots<'a> {
  fn from(card: &'a PrescriptionCard) -> Self {
    Self {
      alt: &card.alt,
      image_path: &card.image_path,
      title_line1: &card.title_line1,
      title_line2: &card.title_line2,
      href: &card.href,
    }
  }
}

fn patch_card(card: &str, default: &CardSlots, next: &CardSlots, cta_label: &str) -> String {
  let mut out = set_first_img_alt(card, next.alt);
  out = replace_markup_media(&out, default.image_path, next.image_path);
  out = patch_balanced_element_by_start_marker(&out, CARD_TITLE_MARKER, "h3", |title| {
    set_first_em_text(&set_first_span_text(title, next.title_line1), next.title_line2)
  });
  patch_first_anchor(&out, &AnchorUpdate::new(cta_label, next.href, false))
}

fn patch_heading_and_description(section: &str, line1: &str, line2: &str, description: &str) -> String {
  let out = patch_balanced_element_by_start_marker(section, HEADING_MARKER, "h2", |heading| {
    let heading = animate(heading, HEADING_LINE1_MARKER, "span", line1);
    animate(&heading, HEADING_LINE2_MARKER, "span", line2)
  });
  animate(&out, DESCRIPTION_MARKER, "p", description)
}

fn patch_stats(section: &str, panel: &FeaturePanelContent) -> String {
  let stats = [&panel.stat1, &panel.stat2];
  let out = replace_each(section, stat_value_re(), |i, caps| {
    let stat = stats.get(i)?;
    let current = &caps[2];
    let trailing = &current[current.trim_end().len()..];
    Some(format!("{}{}{trailing}{}", &caps[1], escape_html(&stat.value), &caps[3]))
  });
  replace_each(&out, stat_lines_re(), |i, caps| {
    let stat = stats.get(i)?;
    Some(format!("{}{}<br/>{}{}", &caps[1], escape_html(&stat.line1), escape_html(&stat.line2), &caps[2]))
  })
}

fn patch_primary(section: &str, panel: &FeaturePanelContent, defaults: &FeaturePanelContent, ctx: &mut PatchContext) -> String {
  let expected = defaults.cards.len();
  let ranges = find_balanced_element_ranges_by_start_marker(section, CARD_MARKER, "div", expected);
  if ranges.len() < expected {
    ctx.log.warn("feature-panel-primary", format!("expected {expected} cards but found {}.", ranges.len()));
  }

  let edits: Vec<Replacement> = ranges
    .iter()
    .zip(defaults.cards.iter().zip(&panel.cards))
    .map(|(range, (default, next))| {
      let patched = patch_card(range.slice(section), &default.into(), &next.into(), &panel.card_cta_label);
      Replacement::new(*range, patched)
    })
    .collect();

  let out = replace_ranges_by_offsets(section, &edits);
  let out = patch_heading_and_description(&out, &panel.heading_line1, &panel.heading_line2, &panel.description);
  patch_stats(&out, panel)
}

fn patch_prescription(
  section: &str,
  panel: &FeaturePanelContent,
  defaults: &FeaturePanelContent,
  ctx: &mut PatchContext,
) -> String {
  let ranges = find_balanced_element_ranges_by_start_marker(section, CARD_MARKER, "div", 1);
  let Some(range) = ranges.first() else {
    ctx.log.warn("feature-panel-prescription", "expected at least one card but none were found.");
    return section.to_string();
  };

  let card = &panel.prescription_card;
  let patched = patch_card(
    range.slice(section),
    &(&defaults.prescription_card).into(),
    &card.into(),
    &card.cta_label,
  );
  let mut out = replace_ranges_by_offsets(section, &[Replacement::new(*range, patched)]);
  out = patch_heading_and_description(&out, &panel.care_heading_line1, &panel.care_heading_line2, &panel.care_description);

  out = replace_text(
    &out,
    &format!("alt=\"{}\"", escape_html(&defaults.testimonial_alt)),
    &format!("alt=\"{}\"", escape_html(&panel.testimonial_alt)),
  );
  out = replace_text(&out, &defaults.badge_title, &panel.badge_title);
  replace_text(&out, &defaults.badge_status, &panel.badge_status)
}

/// Two sibling containers share one marker: the primary cards panel first,
/// then the prescription and care panel.
pub(crate) fn patch_markup(markup: &str, panel: &FeaturePanelContent, ctx: &mut PatchContext) -> String {
  let defaults = FeaturePanelContent::defaults();
  let ranges = find_balanced_element_ranges_by_start_marker(markup, CONTAINER_MARKER, "div", 2);
  if ranges.is_empty() {
    ctx.log.warn(SECTION, "container not found.");
    return markup.to_string();
  }
  ctx.mark(SECTION);
  if ranges.len() < 2 {
    ctx.log.warn(SECTION, format!("expected 2 sections but found {}.", ranges.len()));
  }

  let mut edits = Vec::with_capacity(2);
  if let Some(primary) = ranges.first() {
    edits.push(Replacement::new(*primary, patch_primary(primary.slice(markup), panel, &defaults, ctx)));
  }
  if let Some(prescription) = ranges.get(1) {
    edits.push(Replacement::new(*prescription, patch_prescription(prescription.slice(markup), panel, &defaults, ctx)));
  }
  replace_ranges_by_offsets(markup, &edits)
}

pub(crate) fn patch_payload(payload: &str, panel: &FeaturePanelContent, ctx: &mut PatchContext) -> String {
  let d = FeaturePanelContent::defaults();

  let mut out = patch_payload_window(
    payload,
    PRIMARY_WINDOW_START,
    Some(PRESCRIPTION_WINDOW_START),
    "feature-panel-primary-flight",
    &mut ctx.log,
    |window| {
      let mut window = window.to_string();
      for (default, next) in d.cards.iter().zip(&panel.cards) {
        window = replace_script_fields(
          &window,
          [
            ("alt", default.alt.as_str(), next.alt.as_str()),
            ("children", default.title_line1.as_str(), next.title_line1.as_str()),
            ("children", default.title_line2.as_str(), next.title_line2.as_str()),
            ("href", default.href.as_str(), next.href.as_str()),
          ],
        );
        window = replace_src_variants(&window, &default.image_path, &next.image_path);
      }
      let stat2_value_default = format!("{} ", d.stat2.value);
      let stat2_value_next = format!("{} ", panel.stat2.value);
      replace_script_fields(
        &window,
        [
          ("children", d.card_cta_label.as_str(), panel.card_cta_label.as_str()),
          ("children", d.heading_line1.as_str(), panel.heading_line1.as_str()),
          ("children", d.heading_line2.as_str(), panel.heading_line2.as_str()),
          ("children", d.description.as_str(), panel.description.as_str()),
          ("children", d.stat1.value.as_str(), panel.stat1.value.as_str()),
          ("children", d.stat1.line1.as_str(), panel.stat1.line1.as_str()),
          ("children", d.stat1.line2.as_str(), panel.stat1.line2.as_str()),
          ("children", d.stat2.value.as_str(), panel.stat2.value.as_str()),
          ("children", stat2_value_default.as_str(), stat2_value_next.as_str()),
          ("children", d.stat2.line1.as_str(), panel.stat2.line1.as_str()),
          ("children", d.stat2.line2.as_str(), panel.stat2.line2.as_str()),
        ],
      )
    },
  );

  let (dp, np) = (&d.prescription_card, &panel.prescription_card);
  out = patch_payload_window(
    &out,
    PRESCRIPTION_WINDOW_START,
    Some(PRESCRIPTION_WINDOW_END),
    "feature-panel-prescription-flight",
    &mut ctx.log,
    |window| {
      let window = replace_script_fields(
        window,
        [
          ("alt", dp.alt.as_str(), np.alt.as_str()),
          ("children", dp.title_line1.as_str(), np.title_line1.as_str()),
          ("children", dp.title_line2.as_str(), np.title_line2.as_str()),
          ("href", dp.href.as_str(), np.href.as_str()),
          ("children", dp.cta_label.as_str(), np.cta_label.as_str()),
        ],
      );
      replace_src_variants(&window, &dp.image_path, &np.image_path)
    },
  );

  out = patch_payload_window(
    &out,
    CARE_WINDOW_START,
    Some(CARE_WINDOW_END),
    "feature-panel-care-text-flight",
    &mut ctx.log,
    |window| {
      replace_script_fields(
        window,
        [
          ("children", d.care_heading_line1.as_str(), panel.care_heading_line1.as_str()),
          ("children", d.care_heading_line2.as_str(), panel.care_heading_line2.as_str()),
          ("children", d.care_description.as_str(), panel.care_description.as_str()),
          ("alt", d.testimonial_alt.as_str(), panel.testimonial_alt.as_str()),
        ],
      )
    },
  );

  replace_script_fields(
    &out,
    [
      ("children", d.badge_title.as_str(), panel.badge_title.as_str()),
      ("children", d.badge_status.as_str(), panel.badge_status.as_str()),
    ],
  )
}

fn replace_src_variants(window: &str, from: &str, to: &str) -> String {
  mirror_injector::build_media_path_replacement_pairs(from, to)
    .iter()
    .fold(window.to_string(), |acc, (f, t)| replace_escaped_script_field_value(&acc, "src", f, t))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn card(img: &str, line1: &str, line2: &str, href: &str) -> String {
    format!(
      r#"{CARD_MARKER}<img alt="{line1}" src="{img}"/>{CARD_TITLE_MARKER}<span>{line1}</span> <em>{line2}</em></h3><a href="{href}"><span>Learn More</span></a></div>"#
    )
  }

  fn primary() -> String {
    format!(
      r#"{CONTAINER_MARKER}{}{}<div class="italic text-[80px] font-medium text-blueZodiac font-victorSerif">100+ </div><div class="text-grey-500 text-2xl">Biomarkers<br/>Tested</div><div class="italic text-[80px] font-medium text-blueZodiac font-victorSerif">12+</div><div class="text-grey-500 text-2xl">Health<br/>Categories</div></div>"#,
      card("/api/media/file/Testing%20for%20home%20page.webp", "At-home", "Lab Tests", "/longeviti-panel"),
      card("/api/media/file/Supps%20for%20home%20page.webp", "Customized", "Supplements", "/longeviti-blend"),
    )
  }

  fn prescription() -> String {
    format!(
      r#"{CONTAINER_MARKER}{}<img alt="Testimonial" src="/t.png"/><p>HSA/FSA</p><p>ACCEPTED</p></div>"#,
      card("/api/media/file/Longevity%20Rx%20for%20home%20page.webp", "Prescription", "Medications", "/product-list-rx")
    )
  }

  #[test]
  fn markup_cards_and_stats() {
    let site = json!({
      "featurePanel": {
        "cardCtaLabel": "Details",
        "cards": [{"alt": "Boiler", "titleLine1": "Boiler", "titleLine2": "Service", "href": "/boiler", "imagePath": "/m/boiler.webp"}],
        "stat1": {"value": "500+"},
        "stat2": {"line1": "Happy", "line2": "Homes"}
      }
    });
    let markup = format!("{}{}", primary(), prescription());
    let mut ctx = PatchContext::new();
    let out = patch_markup(&markup, &FeaturePanelContent::resolve(&site), &mut ctx);

    assert!(out.contains(r#"<img alt="Boiler" src="/m/boiler.webp"/>"#));
    assert!(out.contains(r#"<span>Boiler</span> <em>Service</em></h3><a href="/boiler"><span>Details</span></a>"#));
    assert!(out.contains(r#"<a href="/longeviti-blend"><span>Details</span></a>"#));
    assert!(out.contains(r#"font-victorSerif">500+ </div>"#));
    assert!(out.contains(r#"<div class="text-grey-500 text-2xl">Happy<br/>Homes</div>"#));
    assert!(out.contains(r#"<a href="/product-list-rx"><span>Learn More</span></a>"#));
    assert!(ctx.log.is_empty());
    assert_eq!(ctx.matched, vec![SECTION]);
  }

  #[test]
  fn markup_prescription_badges() {
    let site = json!({"featurePanel": {"testimonialAlt": "Review", "badgeTitle": "iDEAL", "badgeStatus": "WELCOME"}});
    let markup = format!("{}{}", primary(), prescription());
    let mut ctx = PatchContext::new();
    let out = patch_markup(&markup, &FeaturePanelContent::resolve(&site), &mut ctx);
    assert!(out.contains(r#"<img alt="Review" src="/t.png"/><p>iDEAL</p><p>WELCOME</p>"#));
  }

  #[test]
  fn markup_single_section_warns() {
    let mut ctx = PatchContext::new();
    patch_markup(&primary(), &FeaturePanelContent::defaults(), &mut ctx);
    assert_eq!(ctx.log.warnings(), ["[mirror slots] feature-panel: expected 2 sections but found 1."]);
  }

  #[test]
  fn markup_card_shortfall_warns() {
    let markup = format!("{CONTAINER_MARKER}{}</div>{}", card("/a.png", "A", "B", "/c"), prescription());
    let mut ctx = PatchContext::new();
    patch_markup(&markup, &FeaturePanelContent::defaults(), &mut ctx);
    assert_eq!(ctx.log.warnings(), ["[mirror slots] feature-panel-primary: expected 2 cards but found 1."]);
  }

  #[test]
  fn payload_windows() {
    let payload = concat!(
      r#"{\"src\":\"/api/media/file/Testing%20for%20home%20page.webp\",\"alt\":\"At-home\"},{\"children\":\"Learn More\"},"#,
      r#"{\"src\":\"/api/media/file/Longevity%20Rx%20for%20home%20page.webp\",\"children\":\"Learn More\"},"#,
      r#"{\"src\":\"/api/media/file/Care%20team%20for%20home%20page.webp\"},{\"children\":\"HSA/FSA\"}"#
    );
    let site = json!({"featurePanel": {"cardCtaLabel": "Details", "cards": [{"alt": "Boiler", "imagePath": "/b.webp"}], "badgeTitle": "iDEAL"}});
    let mut ctx = PatchContext::new();
    let out = patch_payload(payload, &FeaturePanelContent::resolve(&site), &mut ctx);
    assert!(out.starts_with(r#"{\"src\":\"/b.webp\",\"alt\":\"Boiler\"},{\"children\":\"Details\"},"#));
    assert!(out.contains(r#"Longevity%20Rx%20for%20home%20page.webp\",\"children\":\"Learn More\"}"#));
    assert!(out.ends_with(r#"{\"children\":\"iDEAL\"}"#));
    assert_eq!(ctx.log.warnings(), ["[mirror slots] feature-panel-care-text-flight: start marker not found."]);
  }
}
