/* src/server/engine/rust/src/sections/footer.rs */

use std::sync::OnceLock;

use mirror_injector::{
  AnchorUpdate, Replacement, SlotLog, escape_html, find_balanced_element_ranges_by_start_marker, find_first_mut,
  for_each_match_mut, patch_anchors_by_index, patch_chunk_by_needle, patch_chunk_lines, replace_ranges_by_offsets,
  set_attribute_in_tag,
};
use regex::Regex;
use serde_json::{Map, Value, json};

use super::{
  PatchContext, replace_between, replace_each, replace_markup_media, replace_script_fields, replace_text,
  with_container, write_children, write_first, write_image,
};
use crate::content::{FooterContent, FooterLink, SectionContent};

pub(crate) const SECTION: &str = "footer";

const CONTAINER_MARKER: &str = r#"<footer class="rounded-t-[30px] relative z-10 bg-blueZodiac text-white">"#;
const LINK_LIST_MARKER: &str = r#"<ul class="mt-6 flex flex-col gap-2 text-xs text-grey-200">"#;
const LINK_CLASS: &str = "cursor-pointer hover:underline hover:text-grey-50";
const COPYRIGHT_CLASS: &str = "text-grey-500 text-sm font-medium";
const LOGO_SRC: &str = "/big-logo.svg";

const ROOT_NEEDLE: &str = r#"\"className\":\"rounded-t-[30px] relative z-10 bg-blueZodiac text-white\""#;
const LINKS_NEEDLE: &str = r#"\"children\":\"Help & Support\""#;
const CARD_NEEDLE: &str = r#"\"children\":\"Find us on the App Store and Google Play Store\""#;
const META_NEEDLE: &str = r#"\"className\":\"text-grey-500 text-sm font-medium\""#;

fn email_input_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)<input\b[^>]*type="email"[^>]*>"#).unwrap())
}

fn button_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)(<button\b[^>]*>).*?(</button>)").unwrap())
}

fn grey_paragraph_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?s)(<p class="text-sm text-grey-50">).*?(</p>)"#).unwrap())
}

fn support_title_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)(<p class="text-grey-50">)Help &amp; Support(</p>)"#).unwrap())
}

fn about_title_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)(<p class="text-grey-50">)About Geviti(</p>)"#).unwrap())
}

fn disclaimer_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?s)(<p class="text-\[10px\][^"]*">).*?(</p>)"#).unwrap())
}

fn copyright_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)(<p class="text-grey-500 text-sm font-medium">).*?(</p>)"#).unwrap())
}

fn copyright_text_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)^©\s*(\d{4})(.*)$").unwrap())
}

fn replace_alt(source: &str, from: &str, to: &str) -> String {
  if from == to {
    return source.to_string();
  }
  source.replace(&format!("alt=\"{}\"", escape_html(from)), &format!("alt=\"{}\"", escape_html(to)))
}

fn replace_href(source: &str, from: &str, to: &str) -> String {
  if from == to {
    return source.to_string();
  }
  source.replace(&format!("href=\"{}\"", escape_html(from)), &format!("href=\"{}\"", escape_html(to)))
}

fn anchor_updates(links: &[FooterLink]) -> Vec<AnchorUpdate> {
  links.iter().map(|link| AnchorUpdate::new(link.label.as_str(), link.href.as_str(), false)).collect()
}

/// Rewrite the two link lists by index. Fewer than two lists is reported.
fn patch_link_lists(section: &str, footer: &FooterContent, log: &mut SlotLog) -> String {
  let ranges = find_balanced_element_ranges_by_start_marker(section, LINK_LIST_MARKER, "ul", 2);
  if ranges.len() < 2 {
    log.warn("footer-section", format!("expected 2 footer link lists but found {}.", ranges.len()));
  }

  let lists = [anchor_updates(&footer.support_links), anchor_updates(&footer.about_links)];
  let replacements: Vec<Replacement> = ranges
    .iter()
    .zip(lists.iter())
    .enumerate()
    .filter(|(_, (_, updates))| !updates.is_empty())
    .map(|(index, (range, updates))| {
      let slot = format!("footer-links-{}", index + 1);
      Replacement::new(*range, patch_anchors_by_index(range.slice(section), updates, &slot, log))
    })
    .collect();
  replace_ranges_by_offsets(section, &replacements)
}

pub(crate) fn patch_markup(markup: &str, footer: &FooterContent, ctx: &mut PatchContext) -> String {
  let d = FooterContent::defaults();
  with_container(markup, CONTAINER_MARKER, "footer", SECTION, ctx, |section, ctx| {
    let mut out = replace_alt(section, &d.logo_alt, &footer.logo_alt);
    out = email_input_re()
      .replace(&out, |caps: &regex::Captures| set_attribute_in_tag(&caps[0], "placeholder", &footer.email_placeholder))
      .into_owned();
    out = replace_between(&out, button_re(), &footer.subscribe_label);

    out = replace_each(&out, grey_paragraph_re(), |index, caps| {
      let text = match index {
        0 => &footer.subscription_text,
        1 => &footer.follow_us_label,
        _ => return None,
      };
      Some(format!("{}{}{}", &caps[1], escape_html(text), &caps[2]))
    });
    out = replace_between(&out, support_title_re(), &footer.support_title);
    out = replace_between(&out, about_title_re(), &footer.about_title);

    out = patch_link_lists(&out, footer, &mut ctx.log);

    let disclaimer = escape_html(&footer.legal_disclaimer);
    out = disclaimer_re()
      .replace_all(&out, |caps: &regex::Captures| format!("{}{disclaimer}{}", &caps[1], &caps[2]))
      .into_owned();

    out = replace_alt(&out, &d.card_image_alt, &footer.card_image_alt);
    out = replace_markup_media(&out, &d.card_desktop_image_path, &footer.card_desktop_image_path);
    out = replace_markup_media(&out, &d.card_mobile_image_path, &footer.card_mobile_image_path);
    out = replace_text(&out, &d.app_prompt, &footer.app_prompt);

    out = replace_href(&out, &d.app_store_href, &footer.app_store_href);
    out = replace_href(&out, &d.google_play_href, &footer.google_play_href);
    out = replace_alt(&out, &d.app_store_alt, &footer.app_store_alt);
    out = replace_alt(&out, &d.google_play_alt, &footer.google_play_alt);
    out = replace_markup_media(&out, &d.app_store_image_path, &footer.app_store_image_path);
    out = replace_markup_media(&out, &d.google_play_image_path, &footer.google_play_image_path);

    replace_between(&out, copyright_re(), &footer.copyright_text)
  })
}

/// `© 2026 Acme | Rights` becomes `["© ", 2026, " Acme | Rights"]`, the shape
/// the footer component renders. Other text is kept as one string.
pub(crate) fn copyright_children(text: &str) -> Value {
  let normalized = text.trim();
  let Some(caps) = copyright_text_re().captures(normalized) else {
    return Value::String(normalized.to_string());
  };
  let suffix = caps[2].trim();
  let suffix = if suffix.is_empty() { String::new() } else { format!(" {suffix}") };
  let year = caps[1].parse::<u64>().map(Value::from).unwrap_or_else(|_| Value::String(caps[1].to_string()));
  json!(["© ", year, suffix])
}

fn str_member<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  node.get(key).and_then(Value::as_str)
}

fn is_link_node(node: &Value) -> bool {
  node.as_object().is_some_and(|map| {
    str_member(map, "className") == Some(LINK_CLASS) && str_member(map, "href").is_some() && str_member(map, "children").is_some()
  })
}

fn patch_flight<F>(payload: &str, needle: &str, marker: &str, slot: &str, log: &mut SlotLog, mut edit: F) -> String
where
  F: FnMut(&mut Value, &mut SlotLog),
{
  patch_chunk_by_needle(payload, needle, slot, log, |chunk, log| {
    Some(patch_chunk_lines(chunk, marker, slot, log, |line, log| {
      edit(line, log);
      true
    }))
  })
}

fn patch_links(line: &mut Value, footer: &FooterContent, d: &FooterContent, log: &mut SlotLog) {
  write_children(line, &d.support_title, &footer.support_title);
  write_children(line, &d.about_title, &footer.about_title);

  let links: Vec<&FooterLink> = footer.support_links.iter().chain(&footer.about_links).collect();
  let mut index = 0;
  let found = for_each_match_mut(line, &is_link_node, &mut |node: &mut Value| {
    if let (Some(link), Some(map)) = (links.get(index), node.as_object_mut()) {
      map.insert("href".to_string(), Value::String(link.href.clone()));
      map.insert("children".to_string(), Value::String(link.label.clone()));
    }
    index += 1;
  });
  if found < links.len() {
    log.warn("footer-links-flight", format!("expected {} links but found {found}.", links.len()));
  }
}

fn patch_card(line: &mut Value, footer: &FooterContent, d: &FooterContent) {
  write_image(line, &d.card_desktop_image_path, &footer.card_desktop_image_path, &footer.card_image_alt);
  write_image(line, &d.card_mobile_image_path, &footer.card_mobile_image_path, &footer.card_image_alt);
  write_children(line, &d.app_prompt, &footer.app_prompt);
  write_first(line, |node| str_member(node, "href") == Some(d.app_store_href.as_str()), &[("href", footer.app_store_href.as_str())]);
  write_first(
    line,
    |node| str_member(node, "href") == Some(d.google_play_href.as_str()),
    &[("href", footer.google_play_href.as_str())],
  );
  write_image(line, &d.app_store_image_path, &footer.app_store_image_path, &footer.app_store_alt);
  write_image(line, &d.google_play_image_path, &footer.google_play_image_path, &footer.google_play_alt);
  write_children(line, &d.legal_disclaimer, &footer.legal_disclaimer);
}

fn patch_meta(line: &mut Value, footer: &FooterContent) {
  write_first(
    line,
    |node| {
      str_member(node, "src") == Some(LOGO_SRC) && str_member(node, "className").is_some_and(|class| class.contains("lg:hidden"))
    },
    &[("alt", footer.logo_alt.as_str())],
  );
  let copyright = find_first_mut(line, &|node: &Value| {
    node.as_object().is_some_and(|map| str_member(map, "className") == Some(COPYRIGHT_CLASS))
  });
  if let Some(map) = copyright.and_then(Value::as_object_mut) {
    map.insert("children".to_string(), copyright_children(&footer.copyright_text));
  }
}

pub(crate) fn patch_payload(payload: &str, footer: &FooterContent, ctx: &mut PatchContext) -> String {
  let d = FooterContent::defaults();
  let log = &mut ctx.log;

  let mut out = patch_flight(payload, ROOT_NEEDLE, r#""$","footer",null"#, "footer-root-flight", log, |line, _| {
    write_first(
      line,
      |node| str_member(node, "src") == Some(LOGO_SRC) && str_member(node, "className") == Some("max-lg:hidden"),
      &[("alt", footer.logo_alt.as_str())],
    );
    write_children(line, &d.subscription_text, &footer.subscription_text);
    write_children(line, &d.follow_us_label, &footer.follow_us_label);
  });
  out = patch_flight(&out, LINKS_NEEDLE, r#""children":"Help & Support""#, "footer-links-flight", log, |line, log| {
    patch_links(line, footer, &d, log)
  });
  out = patch_flight(&out, CARD_NEEDLE, &format!(r#""children":"{}""#, d.app_prompt), "footer-card-flight", log, |line, _| {
    patch_card(line, footer, &d)
  });
  out = patch_flight(&out, META_NEEDLE, &format!(r#""className":"{COPYRIGHT_CLASS}""#), "footer-meta-flight", log, |line, _| {
    patch_meta(line, footer)
  });

  replace_script_fields(
    &out,
    [
      ("children", d.legal_disclaimer.as_str(), footer.legal_disclaimer.as_str()),
      ("placeholder", d.email_placeholder.as_str(), footer.email_placeholder.as_str()),
      ("children", d.subscribe_label.as_str(), footer.subscribe_label.as_str()),
    ],
  )
}
