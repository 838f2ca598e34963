/* src/server/engine/rust/src/tests/mod.rs */

use super::*;
use serde_json::json;


const HERO_OPEN: &str =
  r#"<div class="relative safe-h-screen flex items-end justify-center text-white overflow-hidden" data-theme="dark">"#;
const FAQ_OPEN: &str = r#"<div class="mt-11 lg:mt-[177px] mb-[76px] lg:mb-[188px]">"#;
const WORD: &str = r#"<span class="inline-block whitespace-pre" style="opacity:0">"#;

/// Word spans for an animated heading, one per whitespace-preserving token.
fn words(text: &str) -> String {
  mirror_injector::tokenize_preserving_whitespace(text).into_iter().map(|t| format!("{WORD}{t}</span>")).collect()
}

fn hero_markup() -> String {
  format!(
    concat!(
      "{open}<h1><span class=\"whitespace-pre-wrap\" aria-label=\"Your Best Years\">",
      "<span class=\"sr-only\">Your Best Years</span>{words}</span></h1>",
      "<a class=\"btn\" href=\"/pricing\"><span>Start Testing</span></a></div>"
    ),
    open = HERO_OPEN,
    words = words("Your Best Years"),
  )
}

fn faq_markup(questions: &[&str]) -> String {
  let items: String = questions
    .iter()
    .map(|q| {
      format!(
        r#"<details><summary><span class="max-lg:text-sm text-balticSea">{q}</span></summary><p class="text-[#99A0AE] max-lg:text-sm">answer</p></details>"#
      )
    })
    .collect();
  format!("{FAQ_OPEN}{items}</div>")
}

/// One streamed flight chunk holding `lines`, wrapped in its script tag.
fn flight_script(lines: &[String]) -> String {
  let chunk = format!("{}\n", lines.join("\n"));
  format!(
    "<script>{}{}{}",
    mirror_injector::CHUNK_START,
    mirror_injector::encode_json_fragment(&chunk),
    mirror_injector::CHUNK_END
  )
}

fn warnings_for<'a>(report: &'a PatchReport, section: &str) -> Vec<&'a str> {
  let head = format!("{} {section}:", mirror_injector::SLOT_PREFIX);
  report.warnings.iter().map(String::as_str).filter(|w| w.starts_with(&head)).collect()
}

/// Decode every pushed chunk in `body` and return its non-empty flight lines.
fn decoded_flight_lines(body: &str) -> Vec<String> {
  let mut lines = Vec::new();
  let mut rest = body;
  while let Some(start) = rest.find(mirror_injector::CHUNK_START) {
    let after = &rest[start + mirror_injector::CHUNK_START.len()..];
    let end = after.find(mirror_injector::CHUNK_END).unwrap();
    let chunk = mirror_injector::decode_json_fragment(&after[..end]).unwrap();
    lines.extend(chunk.lines().filter(|line| !line.is_empty()).map(str::to_string));
    rest = &after[end..];
  }
  lines
}
