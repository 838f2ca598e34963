/* src/server/injector/rust/src/escape.rs */

use std::sync::OnceLock;

use regex::Regex;

/// Escape text for HTML text nodes and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// JSON string-literal encoding of `s` without the surrounding quotes.
pub fn encode_json_fragment(s: &str) -> String {
  let quoted = serde_json::to_string(s).unwrap_or_default();
  quoted
    .strip_prefix('"')
    .and_then(|rest| rest.strip_suffix('"'))
    .map(str::to_string)
    .unwrap_or_default()
}

/// Inverse of `encode_json_fragment`. `None` when the fragment is not a valid
/// JSON string body.
pub fn decode_json_fragment(s: &str) -> Option<String> {
  serde_json::from_str::<String>(&format!("\"{s}\"")).ok()
}

/// Escape every regex metacharacter in `s`.
pub fn escape_regex(s: &str) -> String {
  regex::escape(s)
}

fn token_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\S+|\s+").unwrap())
}

fn whitespace_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Split into alternating runs of non-whitespace and whitespace. An empty input
/// yields a single empty token.
pub fn tokenize_preserving_whitespace(s: &str) -> Vec<&str> {
  let tokens: Vec<&str> = token_re().find_iter(s).map(|m| m.as_str()).collect();
  if tokens.is_empty() { vec![s] } else { tokens }
}

/// Collapse whitespace runs to one space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
  whitespace_re().replace_all(s, " ").trim().to_string()
}
