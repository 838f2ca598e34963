/* src/server/engine/rust/src/sections/faq.rs */

use std::sync::OnceLock;

use mirror_injector::{
  AnchorUpdate, SlotLog, escape_html, find_first_mut, patch_anchor_node, patch_balanced_element_by_start_marker,
  patch_chunk_by_needle, patch_chunk_lines, set_attribute_in_tag, str_field,
};
use regex::Regex;
use serde_json::Value;

use super::{PatchContext, animate, replace_between, replace_each, with_container};
use crate::content::{FaqContent, SectionContent};

pub(crate) const SECTION: &str = "faq";

const CONTAINER_MARKER: &str = r#"<div class="mt-11 lg:mt-[177px] mb-[76px] lg:mb-[188px]">"#;
const HEADING_MARKER: &str = r#"<h2 class="darkBg:text-white capitalize font-450 whitespace-nowrap text-heading">"#;
const HEADING_LINE1_MARKER: &str = r#"<span class="whitespace-pre-wrap" aria-label="#;
const HEADING_LINE2_MARKER: &str =
  r#"<em class="whitespace-pre-wrap font-victorSerif font-medium italic text-heading" aria-label="#;

const PAYLOAD_NEEDLE: &str = r#"\"blockType\":\"faq\""#;
const LINE_MARKER: &str = r#""blockType":"faq""#;
const FLIGHT_SLOT: &str = "faq-section-flight";

fn question_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?s)(<span class="max-lg:text-sm text-balticSea">).*?(</span>)"#).unwrap())
}

fn answer_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?s)(<p class="text-\[#99A0AE\] max-lg:text-sm">).*?(</p>)"#).unwrap())
}

fn card_image_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)<img\b[^>]*class="w-full h-full object-cover rounded-2xl"[^>]*>"#).unwrap())
}

fn support_title_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)(<h5 class="font-medium text-xl text-white">).*?(</h5>)"#).unwrap())
}

fn support_description_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)(<p class="italic text-grey-100 mt-1 font-victorSerif font-medium">).*?(</p>)"#).unwrap())
}

fn support_anchor_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)<a\b[^>]*href="/contact-us"[^>]*>.*?</a>"#).unwrap())
}

/// Rewrite each match of `re` with the text `pick` selects for its index and
/// warn when fewer than `expected` matches exist.
fn patch_positional<F>(source: &str, re: &Regex, expected: usize, what: &str, log: &mut SlotLog, pick: F) -> String
where
  F: Fn(usize) -> Option<String>,
{
  let mut seen = 0;
  let out = replace_each(source, re, |i, caps| {
    seen = i + 1;
    let text = pick(i)?;
    Some(format!("{}{}{}", &caps[1], escape_html(&text), &caps[2]))
  });
  if seen < expected {
    log.warn("faq-section", format!("expected at least {expected} {what} but found {seen}."));
  }
  out
}

pub(crate) fn patch_markup(markup: &str, faq: &FaqContent, ctx: &mut PatchContext) -> String {
  with_container(markup, CONTAINER_MARKER, "div", SECTION, ctx, |section, ctx| {
    let mut out = patch_balanced_element_by_start_marker(section, HEADING_MARKER, "h2", |heading| {
      let heading = animate(heading, HEADING_LINE1_MARKER, "span", &faq.heading_line1);
      animate(&heading, HEADING_LINE2_MARKER, "em", &faq.heading_line2)
    });

    // Same skip rule as the payload: default entries keep their captured text.
    let defaults = FaqContent::defaults();
    let changed = |i: usize| faq.items.get(i).filter(|item| defaults.items.get(i) != Some(*item));
    let count = faq.items.len();
    out = patch_positional(&out, question_re(), count, "question labels", &mut ctx.log, |i| {
      changed(i).map(|item| item.question.clone())
    });
    out = patch_positional(&out, answer_re(), count, "answers", &mut ctx.log, |i| {
      changed(i).map(|item| item.answer.clone())
    });

    out = card_image_re()
      .replace(&out, |caps: &regex::Captures| set_attribute_in_tag(&caps[0], "alt", &faq.card_image_alt))
      .into_owned();
    out = replace_between(&out, support_title_re(), &faq.support_title);
    out = replace_between(&out, support_description_re(), &faq.support_description);

    let update = AnchorUpdate::new(faq.support_cta_label.as_str(), faq.support_cta_href.as_str(), false);
    support_anchor_re()
      .replace(&out, |caps: &regex::Captures| patch_anchor_node(&caps[0], &update))
      .into_owned()
  })
}

fn is_faq_block(node: &Value) -> bool {
  str_field(node, "blockType") == Some("faq") && node.get("faqs").is_some_and(Value::is_array)
}

/// Items are written by position and only when they differ from the default,
/// so captured entries past the override keep their snapshot text.
fn patch_faq_line(payload: &mut Value, faq: &FaqContent, defaults: &FaqContent, log: &mut SlotLog) -> bool {
  let Some(block) = find_first_mut(payload, &is_faq_block).and_then(Value::as_object_mut) else {
    log.warn(FLIGHT_SLOT, "faq block not found in payload.");
    return false;
  };
  block.insert("title".into(), faq.heading_line1.clone().into());
  block.insert("subtitle".into(), faq.heading_line2.clone().into());

  let Some(faqs) = block.get_mut("faqs").and_then(Value::as_array_mut) else {
    return false;
  };
  if faqs.len() < faq.items.len() {
    log.warn(FLIGHT_SLOT, format!("expected {} faq items but found {}.", faq.items.len(), faqs.len()));
  }
  for ((target, item), default) in faqs.iter_mut().zip(&faq.items).zip(&defaults.items) {
    if item == default {
      continue;
    }
    if let Some(target) = target.as_object_mut() {
      target.insert("question".into(), item.question.clone().into());
      target.insert("answer".into(), item.answer.clone().into());
    }
  }
  true
}

pub(crate) fn patch_payload(payload: &str, faq: &FaqContent, ctx: &mut PatchContext) -> String {
  let defaults = FaqContent::defaults();
  patch_chunk_by_needle(payload, PAYLOAD_NEEDLE, FLIGHT_SLOT, &mut ctx.log, |chunk, log| {
    Some(patch_chunk_lines(chunk, LINE_MARKER, FLIGHT_SLOT, log, |line, log| patch_faq_line(line, faq, &defaults, log)))
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use mirror_injector::{CHUNK_END, CHUNK_START, decode_json_fragment, encode_json_fragment};
  use serde_json::json;

  fn item(question: &str, answer: &str) -> String {
    format!(
      r#"<details><summary><span class="max-lg:text-sm text-balticSea">{question}</span></summary><p class="text-[#99A0AE] max-lg:text-sm">{answer}</p></details>"#
    )
  }

  fn fixture(items: usize) -> String {
    let items: String = (0..items).map(|i| item(&format!("Q{i}"), &format!("A{i}"))).collect();
    format!(
      r#"{CONTAINER_MARKER}{items}<img class="w-full h-full object-cover rounded-2xl" alt="faq"/><h5 class="font-medium text-xl text-white">Still have questions?</h5><p class="italic text-grey-100 mt-1 font-victorSerif font-medium">Feel free</p><a href="/contact-us" target="_blank"><span>Message us</span></a></div>"#
    )
  }

  #[test]
  fn markup_items_and_support() {
    let site = json!({
      "faqSection": {
        "items": [{"question": "Do you fix boilers?", "answer": "Yes & fast."}],
        "cardImageAlt": "Van",
        "supportTitle": "Questions?",
        "supportCtaLabel": "WhatsApp",
        "supportCtaHref": "https://wa.me/31642869931"
      }
    });
    let mut ctx = PatchContext::new();
    let out = patch_markup(&fixture(4), &FaqContent::resolve(&site), &mut ctx);
    assert!(out.contains(">Do you fix boilers?</span>"));
    assert!(out.contains(">Yes &amp; fast.</p>"));
    assert!(!out.contains(">Q0</span>"));
    assert!(out.contains(r#"alt="Van""#));
    assert!(out.contains(">Questions?</h5>"));
    assert!(out.contains(r#"<a href="https://wa.me/31642869931"><span>WhatsApp</span></a>"#));
    assert!(ctx.log.is_empty());
  }

  #[test]
  fn markup_default_entries_keep_captured_text() {
    let site = json!({"faqSection": {"items": [{"question": "Do you fix boilers?", "answer": "Yes."}]}});
    let mut ctx = PatchContext::new();
    let out = patch_markup(&fixture(4), &FaqContent::resolve(&site), &mut ctx);
    assert!(out.contains(">Do you fix boilers?</span>"));
    for i in 1..4 {
      assert!(out.contains(&format!(">Q{i}</span>")), "question {i}");
      assert!(out.contains(&format!(">A{i}</p>")), "answer {i}");
    }
  }

  #[test]
  fn markup_short_list_warns() {
    let mut ctx = PatchContext::new();
    patch_markup(&fixture(3), &FaqContent::defaults(), &mut ctx);
    assert_eq!(
      ctx.log.warnings(),
      [
        "[mirror slots] faq-section: expected at least 4 question labels but found 3.",
        "[mirror slots] faq-section: expected at least 4 answers but found 3."
      ]
    );
  }

  fn faq_chunk(faqs: Value) -> String {
    let line = json!({"layout": [{"blockType": "faq", "id": "f1", "faqs": faqs}]});
    format!("{CHUNK_START}{}{CHUNK_END}", encode_json_fragment(&format!("2c:{line}\n")))
  }

  fn decoded(payload: &str) -> Value {
    let body = &payload[CHUNK_START.len()..payload.len() - CHUNK_END.len()];
    let chunk = decode_json_fragment(body).unwrap();
    serde_json::from_str(chunk.trim_end().strip_prefix("2c:").unwrap()).unwrap()
  }

  #[test]
  fn payload_positional_two_of_four() {
    let captured = json!([
      {"question": "s1", "answer": "a1", "id": "x1"},
      {"question": "s2", "answer": "a2"},
      {"question": "s3", "answer": "a3"},
      {"question": "s4", "answer": "a4"}
    ]);
    let site = json!({
      "faqSection": {
        "headingLine1": "Common",
        "items": [{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "A2"}]
      }
    });
    let mut ctx = PatchContext::new();
    let out = patch_payload(&faq_chunk(captured), &FaqContent::resolve(&site), &mut ctx);
    let block = &decoded(&out)["layout"][0];
    assert_eq!(block["title"], "Common");
    assert_eq!(block["subtitle"], "Questions");
    assert_eq!(block["id"], "f1");
    assert_eq!(block["faqs"][0], json!({"question": "Q1", "answer": "A1", "id": "x1"}));
    assert_eq!(block["faqs"][1], json!({"question": "Q2", "answer": "A2"}));
    assert_eq!(block["faqs"][2], json!({"question": "s3", "answer": "a3"}));
    assert_eq!(block["faqs"][3], json!({"question": "s4", "answer": "a4"}));
    assert!(ctx.log.is_empty());
  }

  #[test]
  fn payload_without_faqs_array_warns() {
    let chunk = format!(
      "{CHUNK_START}{}{CHUNK_END}",
      encode_json_fragment(r#"2c:{"blockType":"faq","faqs":null}"#)
    );
    let mut ctx = PatchContext::new();
    let out = patch_payload(&chunk, &FaqContent::defaults(), &mut ctx);
    assert_eq!(out, chunk);
    assert_eq!(
      ctx.log.warnings(),
      [
        "[mirror slots] faq-section-flight: faq block not found in payload.",
        "[mirror slots] faq-section-flight: no matching chunk lines were patched."
      ]
    );
  }
}
