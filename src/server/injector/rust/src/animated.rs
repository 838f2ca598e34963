/* src/server/injector/rust/src/animated.rs */

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

use crate::escape::{escape_html, tokenize_preserving_whitespace};

fn aria_label_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)\baria-label="[^"]*""#).unwrap())
}

fn sr_only_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)<span class="sr-only">.*?</span>"#).unwrap())
}

fn word_span_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?is)<span class="inline-block whitespace-pre"[^>]*>.*?</span>"#).unwrap())
}

fn span_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)^<span\b[^>]*>").unwrap())
}

/// Rewrite a word-by-word animated heading to `text`.
///
/// Updates the first `aria-label` and the screen-reader span, then replaces the
/// run from the first to the last per-word span with one span per token of
/// `text`, each reusing the first span's opening tag.
pub fn patch_animated_text_element(element: &str, text: &str) -> String {
  let escaped = escape_html(text);
  let label = format!("aria-label=\"{escaped}\"");
  let mut out = aria_label_re().replace(element, NoExpand(&label)).into_owned();
  let sr_only = format!("<span class=\"sr-only\">{escaped}</span>");
  out = sr_only_re().replace(&out, NoExpand(&sr_only)).into_owned();

  let words: Vec<(usize, usize)> = word_span_re().find_iter(&out).map(|m| (m.start(), m.end())).collect();
  let (Some(&(first_start, first_end)), Some(&(_, last_end))) = (words.first(), words.last()) else {
    return out;
  };
  let Some(open) = span_open_re().find(&out[first_start..first_end]) else {
    return out;
  };
  let open_tag = open.as_str();

  let rebuilt: String = tokenize_preserving_whitespace(text)
    .into_iter()
    .map(|token| format!("{open_tag}{}</span>", escape_html(token)))
    .collect();

  format!("{}{rebuilt}{}", &out[..first_start], &out[last_end..])
}

#[cfg(test)]
mod tests {
  use super::*;

  const WORD: &str = r#"<span class="inline-block whitespace-pre" style="opacity:0">"#;

  fn heading(words: &[&str]) -> String {
    let spans: String = words.iter().map(|w| format!("{WORD}{w}</span>")).collect();
    format!(r#"<span aria-label="{}"><span class="sr-only">{}</span>{spans}</span>"#, words.concat(), words.concat())
  }

  #[test]
  fn rebuilds_word_spans() {
    let html = heading(&["Your", " ", "Health"]);
    let out = patch_animated_text_element(&html, "Fast Repairs");
    assert_eq!(
      out,
      format!(
        r#"<span aria-label="Fast Repairs"><span class="sr-only">Fast Repairs</span>{WORD}Fast</span>{WORD} </span>{WORD}Repairs</span></span>"#
      )
    );
  }

  #[test]
  fn escapes_text_everywhere() {
    let html = heading(&["A"]);
    let out = patch_animated_text_element(&html, "Tom & Jerry");
    assert!(out.contains(r#"aria-label="Tom &amp; Jerry""#));
    assert!(out.contains(r#"<span class="sr-only">Tom &amp; Jerry</span>"#));
    assert!(out.contains(&format!("{WORD}&amp;</span>")));
  }

  #[test]
  fn without_word_spans_only_labels_change() {
    let html = r#"<em aria-label="Old"><span class="sr-only">Old</span>Old</em>"#;
    let out = patch_animated_text_element(html, "New");
    assert_eq!(out, r#"<em aria-label="New"><span class="sr-only">New</span>Old</em>"#);
  }

  #[test]
  fn token_count_follows_new_text() {
    let html = heading(&["One"]);
    let out = patch_animated_text_element(&html, "a b  c");
    assert_eq!(out.matches(WORD).count(), 5);
  }
}
