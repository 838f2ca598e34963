/* src/server/injector/rust/src/media.rs */

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything but unreserved URI characters and the path separator.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'/')
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

fn decode_path(path: &str) -> String {
  percent_decode_str(path).decode_utf8().map_or_else(|_| path.to_string(), |s| s.into_owned())
}

fn encode_path(path: &str) -> String {
  utf8_percent_encode(path, PATH_SEGMENT).to_string()
}

/// Every `(from, to)` encoding under which a media path may appear in a
/// snapshot: raw, percent-decoded, re-encoded from the decoded form, and
/// decoded with `+` for spaces. No-op and empty-source pairs are dropped.
pub fn build_media_path_replacement_pairs(from: &str, to: &str) -> Vec<(String, String)> {
  let from_decoded = decode_path(from);
  let to_decoded = decode_path(to);

  let candidates = [
    (from.to_string(), to.to_string()),
    (from_decoded.clone(), to_decoded.clone()),
    (encode_path(&from_decoded), encode_path(&to_decoded)),
    (from_decoded.replace(' ', "+"), to_decoded.replace(' ', "+")),
  ];

  let mut pairs: Vec<(String, String)> = Vec::with_capacity(candidates.len());
  for (from_value, to_value) in candidates {
    if from_value.is_empty() || from_value == to_value {
      continue;
    }
    if pairs.iter().any(|(f, t)| *f == from_value && *t == to_value) {
      continue;
    }
    pairs.push((from_value, to_value));
  }
  pairs
}

/// Replace every encoding of `from` in `source` with the matching encoding of `to`.
pub fn replace_media_path(source: &str, from: &str, to: &str) -> String {
  build_media_path_replacement_pairs(from, to)
    .iter()
    .fold(source.to_string(), |acc, (f, t)| acc.replace(f.as_str(), t))
}

/// Prefix under which captured media requests are served.
pub const MEDIA_REQUEST_PREFIX: &str = "/api/media/file/";

/// Manifest keys a media request path may be stored under: the raw request,
/// its decoded form (with `+` read as a space), the re-encoded form and the
/// `+` spelling. Each carries `MEDIA_REQUEST_PREFIX`; duplicates are dropped.
pub fn build_media_key_variants(request: &str) -> Vec<String> {
  let raw = request.trim_start_matches('/');
  let raw = raw.strip_prefix(MEDIA_REQUEST_PREFIX.trim_start_matches('/')).unwrap_or(raw);
  if raw.is_empty() {
    return Vec::new();
  }

  let decoded = decode_path(raw).replace('+', " ");
  let candidates = [raw.to_string(), decoded.clone(), encode_path(&decoded), decoded.replace(' ', "+")];

  let mut keys: Vec<String> = Vec::with_capacity(candidates.len());
  for candidate in candidates {
    let key = format!("{MEDIA_REQUEST_PREFIX}{candidate}");
    if !keys.contains(&key) {
      keys.push(key);
    }
  }
  keys
}
