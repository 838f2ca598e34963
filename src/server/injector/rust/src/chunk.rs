/* src/server/injector/rust/src/chunk.rs */

use serde_json::Value;

use crate::escape::{decode_json_fragment, encode_json_fragment};
use crate::log::SlotLog;

/// Opening of one streamed flight chunk inside an inline script.
pub const CHUNK_START: &str = r#"self.__next_f.push([1,""#;
/// Closing of one streamed flight chunk.
pub const CHUNK_END: &str = r#""])</script>"#;

const HTML_SAFE_ESCAPES: [(char, &str); 3] = [('>', r"\u003e"), ('<', r"\u003c"), ('&', r"\u0026")];

/// Encode `s` the way a string value sits inside a pushed chunk: once as a
/// JSON string in the flight line, once more as the script string literal.
pub fn encode_script_value(s: &str) -> String {
  encode_json_fragment(&encode_json_fragment(s))
}

/// Replace every occurrence of `from` with `to` in script text, comparing in
/// chunk-encoded form.
pub fn replace_escaped_script_string_value(source: &str, from: &str, to: &str) -> String {
  if from == to || from.is_empty() {
    return source.to_string();
  }
  source.replace(&encode_script_value(from), &encode_script_value(to))
}

/// Like `replace_escaped_script_string_value`, but only where the value is the
/// escaped JSON member `\"field\":\"from\"`.
pub fn replace_escaped_script_field_value(source: &str, field: &str, from: &str, to: &str) -> String {
  if from == to {
    return source.to_string();
  }
  let from_token = format!(r#"\"{field}\":\"{}\""#, encode_script_value(from));
  let to_token = format!(r#"\"{field}\":\"{}\""#, encode_script_value(to));
  source.replace(&from_token, &to_token)
}

/// Restrict `patch` to the text between `start_marker` and the next
/// `end_marker` (or the end of `source`). Missing start marker is reported.
pub fn patch_payload_window<F>(
  source: &str,
  start_marker: &str,
  end_marker: Option<&str>,
  slot: &str,
  log: &mut SlotLog,
  patch: F,
) -> String
where
  F: FnOnce(&str) -> String,
{
  let Some(start) = source.find(start_marker) else {
    log.warn(slot, "start marker not found.");
    return source.to_string();
  };
  let after = start + start_marker.len();
  let end = end_marker
    .filter(|marker| !marker.is_empty())
    .and_then(|marker| source[after..].find(marker).map(|i| i + after))
    .unwrap_or(source.len());

  let mut out = String::with_capacity(source.len());
  out.push_str(&source[..start]);
  out.push_str(&patch(&source[start..end]));
  out.push_str(&source[end..]);
  out
}

/// The needle plus every variant with `>`, `<` and `&` swapped for their
/// `\uXXXX` escapes or back. Order is stable and the base needle comes first.
pub fn build_encoded_needle_variants(needle: &str) -> Vec<String> {
  if needle.is_empty() {
    return Vec::new();
  }

  let mut variants = vec![needle.to_string()];
  for (literal, escaped) in HTML_SAFE_ESCAPES {
    let literal = literal.to_string();
    let snapshot = variants.clone();
    for variant in snapshot {
      if variant.contains(&literal) {
        push_unique(&mut variants, variant.replace(&literal, escaped));
      }
      if variant.contains(escaped) {
        push_unique(&mut variants, variant.replace(escaped, &literal));
      }
    }
  }
  variants
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
  if !variants.contains(&candidate) {
    variants.push(candidate);
  }
}

/// Re-apply the HTML-safe escapes the original chunk was using.
fn encode_chunk_like(decoded: &str, original_encoded: &str) -> String {
  let mut encoded = encode_json_fragment(decoded);
  for (literal, escaped) in HTML_SAFE_ESCAPES {
    if original_encoded.contains(escaped) {
      encoded = encoded.replace(literal, escaped);
    }
  }
  encoded
}

/// Locate the flight chunk containing `needle` (any escape variant), decode it,
/// run `patch`, and re-encode the result in place.
///
/// `patch` returning `None` leaves the source untouched. Every structural
/// failure is reported under `slot` and leaves the source untouched.
pub fn patch_chunk_by_needle<F>(source: &str, needle: &str, slot: &str, log: &mut SlotLog, patch: F) -> String
where
  F: FnOnce(&str, &mut SlotLog) -> Option<String>,
{
  let Some(needle_at) = build_encoded_needle_variants(needle).iter().find_map(|candidate| source.find(candidate.as_str()))
  else {
    log.warn(slot, "needle not found.");
    return source.to_string();
  };

  let Some(chunk_start) = source[..needle_at].rfind(CHUNK_START) else {
    log.warn(slot, "chunk start token not found.");
    return source.to_string();
  };
  let body_start = chunk_start + CHUNK_START.len();

  let Some(body_end) = source[needle_at..].find(CHUNK_END).map(|i| i + needle_at) else {
    log.warn(slot, "chunk end token not found.");
    return source.to_string();
  };

  let encoded = &source[body_start..body_end];
  let Some(decoded) = decode_json_fragment(encoded) else {
    log.warn(slot, "failed to decode chunk payload.");
    return source.to_string();
  };

  let Some(patched) = patch(&decoded, log) else {
    return source.to_string();
  };

  let mut out = String::with_capacity(source.len());
  out.push_str(&source[..body_start]);
  out.push_str(&encode_chunk_like(&patched, encoded));
  out.push_str(&source[body_end..]);
  out
}

/// Walk the `id:json` lines of a decoded chunk. Lines containing `marker` are
/// parsed and handed to `patch`; lines it reports as changed are re-serialized.
pub fn patch_chunk_lines<F>(chunk: &str, marker: &str, slot: &str, log: &mut SlotLog, mut patch: F) -> String
where
  F: FnMut(&mut Value, &mut SlotLog) -> bool,
{
  let mut patched_any = false;
  let lines: Vec<String> = chunk
    .split('\n')
    .map(|line| {
      if !line.contains(marker) {
        return line.to_string();
      }
      let Some((prefix, payload)) = line.split_once(':') else {
        return line.to_string();
      };
      let mut value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => {
          log.warn(slot, "failed to parse payload line.");
          return line.to_string();
        }
      };
      if !patch(&mut value, log) {
        return line.to_string();
      }
      patched_any = true;
      format!("{prefix}:{}", serde_json::to_string(&value).unwrap_or_else(|_| payload.to_string()))
    })
    .collect();

  if !patched_any {
    log.warn(slot, "no matching chunk lines were patched.");
  }
  lines.join("\n")
}
