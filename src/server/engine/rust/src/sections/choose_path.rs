/* src/server/engine/rust/src/sections/choose_path.rs */

use std::sync::OnceLock;

use mirror_injector::{
  Replacement, SlotLog, escape_html, find_balanced_element_ranges_by_start_marker, find_first_mut,
  patch_balanced_element_by_start_marker, patch_chunk_by_needle, patch_chunk_lines, replace_ranges_by_offsets,
  str_field,
};
use regex::Regex;
use serde_json::{Map, Value};

use super::{PatchContext, patch_pricing_cta, replace_between, replace_each, with_container_before};
use crate::content::{ChoosePathContent, Plan, PlanGroup, SectionContent};

pub(crate) const SECTION: &str = "choose-path";

const CONTAINER_MARKER: &str = r#"<div class="mt-24 lg:mt-30 mb-24 lg:mb-30">"#;
const HEADING_ANCHOR: &str =
  r#"<h2 class="text-blueZodiac font-medium italic font-victorSerif text-heading-sm">Choose Your Path</h2>"#;
const CARD_MARKER: &str = r#"<div class="flex flex-col h-full gap-6 relative">"#;
const DISCOUNT_MARKER: &str = r#"<div class="ml-2 flex items-center font-poppins rounded-full justify-center gap-1 px-2 py-[6px] border-[0.5px] border-[#DCFCE7] text-[10px] text-[#15803D] bg-[#F0FDF4]">"#;
const GROUPS_MARKER: &str = r#"<div class="flex flex-col gap-6 mt-8">"#;
const GROUP_MARKER: &str = r#"<div class="flex flex-col gap-3">"#;

const BLOCK_TYPE: &str = "newPricingBlock";
const PAYLOAD_NEEDLE: &str = r#"\"blockType\":\"newPricingBlock\""#;
const LINE_MARKER: &str = r#""blockType":"newPricingBlock""#;
const FLIGHT_SLOT: &str = "choose-path-section-flight";

macro_rules! tag_text_re {
  ($name:ident, $pattern:literal) => {
    fn $name() -> &'static Regex {
      static RE: OnceLock<Regex> = OnceLock::new();
      RE.get_or_init(|| Regex::new($pattern).unwrap())
    }
  };
}

tag_text_re!(title_re, r#"(?is)(<h2 class="text-blueZodiac font-medium italic font-victorSerif text-heading-sm">).*?(</h2>)"#);
tag_text_re!(subtitle_re, r#"(?is)(<p class="capitalize mt-2 text-blueZodiac font-450 text-sm  sm:text-base">).*?(</p>)"#);
tag_text_re!(
  plan_name_re,
  r#"(?is)(<h3 class="text-\[42px\] font-450 text-center">).*?(<em class="font-victorSerif font-medium italic">).*?(</em></h3>)"#
);
tag_text_re!(tagline_re, r#"(?is)(<p class="capitalize text-center text-sm">).*?(</p>)"#);
tag_text_re!(
  price_re,
  r#"(?is)(<h3 class="text-center italic font-victorSerif font-semibold text-\[40px\] text-blueZodiac mt-4">).*?(</h3>)"#
);
tag_text_re!(
  billing_text_re,
  r#"(?is)(<p class="text-center italic font-victorSerif font-semibold text-xl text-blueZodiac mb-4">).*?(</p>)"#
);
tag_text_re!(billing_label_re, r#"(?s)(<span class="italic font-medium font-victorSerif text-black">\s*<!-- -->).*?(</span>)"#);
tag_text_re!(first_span_re, r"(?is)(<span>).*?(</span>)");
tag_text_re!(category_re, r#"(?is)(<h4 class="text-grey-500 text-xl">).*?(</h4>)"#);
tag_text_re!(
  list_item_re,
  r#"(?s)(<li class="text-grey-500 flex items-center gap-\[10px\]">.*?<span>).*?(</span>.*?</li>)"#
);

/// Markup shows a single dollar sign where the payload stores `$$`.
pub(crate) fn markup_money(value: &str) -> &str {
  if value.starts_with("$$") { &value[1..] } else { value }
}

/// Payload money strings carry an escaped `$$` prefix.
pub(crate) fn flight_money(value: &str) -> String {
  if value.starts_with('$') && !value.starts_with("$$") { format!("${value}") } else { value.to_string() }
}

fn patch_group(group: &str, content: &PlanGroup, slot: &str, log: &mut SlotLog) -> String {
  let out = replace_between(group, category_re(), &content.category_name);
  let mut seen = 0;
  let out = replace_each(&out, list_item_re(), |i, caps| {
    seen = i + 1;
    let feature = content.features.get(i)?;
    Some(format!("{}{}{}", &caps[1], escape_html(&feature.name), &caps[2]))
  });
  if seen < content.features.len() {
    log.warn(slot, format!("expected at least {} list items but found {seen}.", content.features.len()));
  }
  out
}

fn patch_groups(container: &str, plan: &Plan, card_slot: &str, log: &mut SlotLog) -> String {
  let groups: Vec<&PlanGroup> = plan.feature.iter().chain(&plan.restriction).collect();
  if groups.is_empty() {
    return container.to_string();
  }
  let ranges = find_balanced_element_ranges_by_start_marker(container, GROUP_MARKER, "div", groups.len());
  if ranges.len() < groups.len() {
    log.warn(card_slot, format!("expected {} list groups but found {}.", groups.len(), ranges.len()));
  }
  let edits: Vec<Replacement> = ranges
    .iter()
    .zip(&groups)
    .enumerate()
    .map(|(i, (range, group))| {
      let slot = format!("{card_slot}-group-{}", i + 1);
      Replacement::new(*range, patch_group(range.slice(container), group, &slot, log))
    })
    .collect();
  replace_ranges_by_offsets(container, &edits)
}

fn patch_card(card: &str, plan: &Plan, index: usize, log: &mut SlotLog) -> String {
  let slot = format!("choose-path-card-{}", index + 1);

  let name = escape_html(&plan.name);
  let style = escape_html(&plan.name_style);
  let mut out = plan_name_re()
    .replace(card, |caps: &regex::Captures| format!("{}{name}<!-- --> {}{style}{}", &caps[1], &caps[2], &caps[3]))
    .into_owned();
  out = replace_between(&out, tagline_re(), &plan.tagline);
  out = replace_between(&out, price_re(), markup_money(&plan.pricing.one_time_price));
  out = replace_between(&out, billing_text_re(), &plan.pricing.twice_annually_billing_text);

  let labels = [&plan.pricing.one_time_label, &plan.pricing.recurring_label];
  let mut seen = 0;
  out = replace_each(&out, billing_label_re(), |i, caps| {
    seen = i + 1;
    let label = labels.get(i)?;
    Some(format!("{}{}{}", &caps[1], escape_html(label), &caps[2]))
  });
  if seen < labels.len() {
    log.warn(&slot, format!("expected at least {} billing labels but found {seen}.", labels.len()));
  }

  out = patch_balanced_element_by_start_marker(&out, DISCOUNT_MARKER, "div", |discount| {
    replace_between(discount, first_span_re(), &plan.pricing.discount_percentage)
  });
  out = patch_balanced_element_by_start_marker(&out, GROUPS_MARKER, "div", |groups| patch_groups(groups, plan, &slot, log));
  patch_pricing_cta(&out, &plan.link.label)
}

pub(crate) fn patch_markup(markup: &str, path: &ChoosePathContent, ctx: &mut PatchContext) -> String {
  with_container_before(markup, HEADING_ANCHOR, CONTAINER_MARKER, "div", SECTION, ctx, |section, ctx| {
    let out = replace_between(section, title_re(), &path.title);
    let out = replace_between(&out, subtitle_re(), &path.subtitle);

    let expected = path.plans.len();
    let ranges = find_balanced_element_ranges_by_start_marker(&out, CARD_MARKER, "div", expected);
    if ranges.len() < expected {
      ctx.log.warn("choose-path-section", format!("expected {expected} cards but found {}.", ranges.len()));
    }
    // Default plans keep their captured card, matching the payload rule.
    let defaults = ChoosePathContent::defaults();
    let edits: Vec<Replacement> = ranges
      .iter()
      .zip(&path.plans)
      .enumerate()
      .filter(|(i, (_, plan))| defaults.plans.get(*i) != Some(*plan))
      .map(|(i, (range, plan))| Replacement::new(*range, patch_card(range.slice(&out), plan, i, &mut ctx.log)))
      .collect();
    replace_ranges_by_offsets(&out, &edits)
  })
}

fn is_pricing_block(node: &Value) -> bool {
  str_field(node, "blockType") == Some(BLOCK_TYPE)
    && node.get("pricing").and_then(|p| p.get("plans")).is_some_and(Value::is_array)
}

/// The object under `key`, replacing a missing or non-object member.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
  let entry = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
  if !entry.is_object() {
    *entry = Value::Object(Map::new());
  }
  entry.as_object_mut()
}

fn write_groups(target: Option<&mut Value>, groups: &[PlanGroup]) {
  let Some(targets) = target.and_then(Value::as_array_mut) else {
    return;
  };
  for (target, group) in targets.iter_mut().zip(groups) {
    let Some(target) = target.as_object_mut() else {
      continue;
    };
    target.insert("categoryName".into(), group.category_name.clone().into());
    let Some(features) = target.get_mut("features").and_then(Value::as_array_mut) else {
      continue;
    };
    for (feature, next) in features.iter_mut().zip(&group.features) {
      if let Some(feature) = feature.as_object_mut() {
        feature.insert("name".into(), next.name.clone().into());
      }
    }
  }
}

fn write_plan(target: &mut Value, plan: &Plan) {
  let Some(target) = target.as_object_mut() else {
    return;
  };
  target.insert("name".into(), plan.name.clone().into());
  target.insert("nameStyle".into(), plan.name_style.clone().into());
  target.insert("tagline".into(), plan.tagline.clone().into());
  target.insert("isPopular".into(), plan.is_popular.into());

  let p = &plan.pricing;
  if let Some(pricing) = object_entry(target, "pricing") {
    pricing.insert("oneTimePrice".into(), flight_money(&p.one_time_price).into());
    pricing.insert("recurringPrice".into(), flight_money(&p.recurring_price).into());
    pricing.insert("oneTimeLabel".into(), p.one_time_label.clone().into());
    pricing.insert("recurringLabel".into(), p.recurring_label.clone().into());
    pricing.insert("discountPercentage".into(), p.discount_percentage.clone().into());
    pricing.insert("twiceAnnuallyBillingText".into(), p.twice_annually_billing_text.clone().into());
    pricing.insert("annuallyBillingText".into(), p.annually_billing_text.clone().into());
  }

  if let Some(link) = object_entry(target, "link") {
    link.insert("label".into(), plan.link.label.clone().into());
  }

  write_groups(target.get_mut("feature"), &plan.feature);
  write_groups(target.get_mut("restriction"), &plan.restriction);
}

/// Title and subtitle are always written; a plan only when it differs from
/// its default, so captured plans past the override stay as they are.
fn patch_pricing_line(payload: &mut Value, path: &ChoosePathContent, defaults: &ChoosePathContent, log: &mut SlotLog) -> bool {
  let Some(block) = find_first_mut(payload, &is_pricing_block) else {
    log.warn(FLIGHT_SLOT, "pricing block not found in payload.");
    return false;
  };
  let Some(block) = block.as_object_mut() else {
    return false;
  };
  block.insert("title".into(), path.title.clone().into());
  block.insert("subtitle".into(), path.subtitle.clone().into());

  let plans = block.get_mut("pricing").and_then(|pricing| pricing.get_mut("plans")).and_then(Value::as_array_mut);
  let Some(plans) = plans else {
    return false;
  };
  if plans.len() < path.plans.len() {
    log.warn(FLIGHT_SLOT, format!("expected {} plans but found {}.", path.plans.len(), plans.len()));
  }
  for ((target, plan), default) in plans.iter_mut().zip(&path.plans).zip(&defaults.plans) {
    if plan != default {
      write_plan(target, plan);
    }
  }
  true
}

pub(crate) fn patch_payload(payload: &str, path: &ChoosePathContent, ctx: &mut PatchContext) -> String {
  let defaults = ChoosePathContent::defaults();
  patch_chunk_by_needle(payload, PAYLOAD_NEEDLE, FLIGHT_SLOT, &mut ctx.log, |chunk, log| {
    Some(patch_chunk_lines(chunk, LINE_MARKER, FLIGHT_SLOT, log, |line, log| {
      patch_pricing_line(line, path, &defaults, log)
    }))
  })
}
