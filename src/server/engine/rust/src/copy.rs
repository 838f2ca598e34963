/* src/server/engine/rust/src/copy.rs */

use std::sync::OnceLock;

use mirror_injector::{escape_regex, normalize_whitespace};
use regex::{NoExpand, Regex, RegexBuilder};
use serde_json::Value;

/// Whitespace-tolerant literal pattern: words of `from` joined by `\s+`.
/// `None` for blank input.
pub fn flexible_exact_pattern(from: &str) -> Option<Regex> {
  let normalized = normalize_whitespace(from);
  if normalized.is_empty() {
    return None;
  }
  let pattern = normalized.split(' ').map(escape_regex).collect::<Vec<_>>().join(r"\s+");
  Regex::new(&pattern).ok()
}

/// One compiled `exactTextReplacements` pair.
#[derive(Debug, Clone)]
pub struct ExactReplacement {
  pub regex: Regex,
  pub to: String,
}

impl ExactReplacement {
  /// `None` for a blank `from`.
  pub fn compile(from: &str, to: &str) -> Option<Self> {
    Some(Self { regex: flexible_exact_pattern(from)?, to: to.to_string() })
  }

  pub fn apply(&self, source: &str) -> String {
    self.regex.replace_all(source, NoExpand(&self.to)).into_owned()
  }
}

/// Replace every whitespace-tolerant occurrence of `from` with `to` taken literally.
pub fn replace_flexible(source: &str, from: &str, to: &str) -> String {
  match ExactReplacement::compile(from, to) {
    Some(exact) => exact.apply(source),
    None => source.to_string(),
  }
}

/// One compiled `regexTextReplacements` entry.
#[derive(Debug, Clone)]
pub struct RegexReplacement {
  pub regex: Regex,
  pub replacement: String,
  pub global: bool,
}

impl RegexReplacement {
  /// Compile from a JS-style `pattern`/`flags` pair. Unknown flags are ignored.
  pub fn compile(pattern: &str, flags: &str, replacement: &str) -> Result<Self, regex::Error> {
    let regex = RegexBuilder::new(pattern)
      .case_insensitive(flags.contains('i'))
      .multi_line(flags.contains('m'))
      .dot_matches_new_line(flags.contains('s'))
      .build()?;
    Ok(Self { regex, replacement: translate_replacement(replacement), global: flags.contains('g') })
  }

  pub fn apply(&self, source: &str) -> String {
    let replacement = self.replacement.as_str();
    if self.global {
      self.regex.replace_all(source, replacement).into_owned()
    } else {
      self.regex.replace(source, replacement).into_owned()
    }
  }
}

fn js_group_ref_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\$(\$|&|\d+|<[A-Za-z_][A-Za-z0-9_]*>)").unwrap())
}

/// Map JS replacement syntax onto the `regex` crate's: `$&` is the whole
/// match, `$n` and `$<name>` become braced group references.
fn translate_replacement(replacement: &str) -> String {
  js_group_ref_re()
    .replace_all(replacement, |caps: &regex::Captures| match &caps[1] {
      "$" => "$$".to_string(),
      "&" => "${0}".to_string(),
      group => format!("${{{}}}", group.trim_start_matches('<').trim_end_matches('>')),
    })
    .into_owned()
}

/// Compile `regexTextReplacements`, dropping malformed entries and invalid patterns.
pub fn build_regex_replacements(entries: Option<&Value>) -> Vec<RegexReplacement> {
  let Some(entries) = entries.and_then(Value::as_array) else {
    return Vec::new();
  };
  entries
    .iter()
    .filter_map(|entry| {
      let pattern = entry.get("pattern")?.as_str()?;
      let flags = entry.get("flags").and_then(Value::as_str).unwrap_or("");
      let replacement = entry.get("replacement").and_then(Value::as_str).unwrap_or("");
      match RegexReplacement::compile(pattern, flags, replacement) {
        Ok(compiled) => Some(compiled),
        Err(err) => {
          tracing::warn!(pattern, "dropping invalid regex replacement: {err}");
          None
        }
      }
    })
    .collect()
}

/// `exactTextReplacements` as `(from, to)` pairs. Entries that are not
/// two-element arrays are skipped; non-string members read as empty.
pub fn exact_replacements(site: &Value) -> Vec<(&str, &str)> {
  let Some(entries) = site.get("exactTextReplacements").and_then(Value::as_array) else {
    return Vec::new();
  };
  entries
    .iter()
    .filter_map(Value::as_array)
    .filter(|pair| pair.len() >= 2)
    .map(|pair| (pair[0].as_str().unwrap_or(""), pair[1].as_str().unwrap_or("")))
    .collect()
}

/// Compile every usable exact pair once; blank sources are dropped.
pub fn build_exact_replacements(site: &Value) -> Vec<ExactReplacement> {
  exact_replacements(site).into_iter().filter_map(|(from, to)| ExactReplacement::compile(from, to)).collect()
}

/// Exact pairs first, then regex entries.
pub fn apply_copy_replacements(source: &str, site: &Value) -> String {
  let regexes = build_regex_replacements(site.get("regexTextReplacements"));
  apply_compiled(source, &build_exact_replacements(site), &regexes)
}

fn apply_compiled(source: &str, exact: &[ExactReplacement], regexes: &[RegexReplacement]) -> String {
  let out = exact.iter().fold(source.to_string(), |acc, pair| pair.apply(&acc));
  regexes.iter().fold(out, |acc, re| re.apply(&acc))
}

fn blocked_block_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"(?is)<(?:script|style|noscript)\b[^>]*>.*?</(?:script|style|noscript)>").unwrap()
  })
}

/// Copy replacements applied only to the text between `script`, `style` and
/// `noscript` blocks.
pub fn apply_copy_replacements_outside_blocked_tags(source: &str, site: &Value) -> String {
  let exact = build_exact_replacements(site);
  let regexes = build_regex_replacements(site.get("regexTextReplacements"));

  let mut out = String::with_capacity(source.len());
  let mut cursor = 0;
  for block in blocked_block_re().find_iter(source) {
    out.push_str(&apply_compiled(&source[cursor..block.start()], &exact, &regexes));
    out.push_str(block.as_str());
    cursor = block.end();
  }
  out.push_str(&apply_compiled(&source[cursor..], &exact, &regexes));
  out
}
