/* src/server/injector/rust/src/range.rs */

/// Half-open byte range `[start, end)` covering one balanced element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub start: usize,
  pub end: usize,
}

impl Range {
  pub fn slice<'a>(&self, source: &'a str) -> &'a str {
    &source[self.start..self.end]
  }
}

/// One splice for `replace_ranges_by_offsets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
  pub start: usize,
  pub end: usize,
  pub content: String,
}

impl Replacement {
  pub fn new(range: Range, content: impl Into<String>) -> Self {
    Self { start: range.start, end: range.end, content: content.into() }
  }
}

/// Next `open_token` at or after `from` that opens exactly that tag name, so
/// `<p` skips `<picture>` and `<path>`.
fn find_open_tag(source: &str, from: usize, open_token: &str) -> Option<usize> {
  let mut search = from;
  while let Some(found) = source[search..].find(open_token).map(|i| i + search) {
    let next = source.as_bytes().get(found + open_token.len());
    if next.is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/') {
      return Some(found);
    }
    search = found + open_token.len();
  }
  None
}

/// Find the element whose opening tag starts at `start` and return the range up to
/// one past its matching `</tag>`. Same-named nested elements are depth-counted.
///
/// Returns `None` when the markup runs out before depth returns to zero.
pub fn find_balanced_element_range(source: &str, start: usize, tag: &str) -> Option<Range> {
  if start > source.len() {
    return None;
  }

  let open_token = format!("<{tag}");
  let close_token = format!("</{tag}>");
  let mut cursor = start;
  let mut depth: usize = 0;

  while cursor < source.len() {
    let next_close = source[cursor..].find(&close_token).map(|i| i + cursor)?;
    let next_open = find_open_tag(source, cursor, &open_token);

    if let Some(open) = next_open.filter(|&open| open < next_close) {
      let open_end = source[open..].find('>').map(|i| i + open)?;
      depth += 1;
      cursor = open_end + 1;
      continue;
    }

    depth = depth.saturating_sub(1);
    cursor = next_close + close_token.len();
    if depth == 0 {
      return Some(Range { start, end: cursor });
    }
  }

  None
}

/// Collect up to `limit` balanced ranges, each starting at the next occurrence of
/// `marker` after the previous range. Document order is the positional index.
pub fn find_balanced_element_ranges_by_start_marker(
  source: &str,
  marker: &str,
  tag: &str,
  limit: usize,
) -> Vec<Range> {
  find_balanced_element_ranges_from(source, marker, tag, limit, 0)
}

pub fn find_balanced_element_ranges_from(
  source: &str,
  marker: &str,
  tag: &str,
  limit: usize,
  from: usize,
) -> Vec<Range> {
  let mut ranges = Vec::new();
  if marker.is_empty() {
    return ranges;
  }

  let mut search = from;
  while search < source.len() && ranges.len() < limit {
    let Some(start) = source[search..].find(marker).map(|i| i + search) else {
      break;
    };
    let Some(range) = find_balanced_element_range(source, start, tag) else {
      break;
    };
    ranges.push(range);
    search = range.end;
  }

  ranges
}

/// Character-level bracket matching, used to lift an escaped JSON object out of
/// script text. `start` must point at `open`.
pub fn find_balanced_symbol_range(source: &str, start: usize, open: char, close: char) -> Option<Range> {
  let tail = source.get(start..)?;
  if !tail.starts_with(open) {
    return None;
  }

  let mut depth: usize = 0;
  for (offset, ch) in tail.char_indices() {
    if ch == open {
      depth += 1;
    } else if ch == close {
      depth = depth.saturating_sub(1);
      if depth == 0 {
        return Some(Range { start, end: start + offset + ch.len_utf8() });
      }
    }
  }

  None
}

/// Splice non-overlapping replacements into `source` in ascending order.
/// Entries that start before the cursor or end before they start are skipped.
pub fn replace_ranges_by_offsets(source: &str, replacements: &[Replacement]) -> String {
  if replacements.is_empty() {
    return source.to_string();
  }

  let mut sorted: Vec<&Replacement> = replacements.iter().collect();
  sorted.sort_by_key(|r| r.start);

  let mut out = String::with_capacity(source.len());
  let mut cursor = 0;
  for replacement in sorted {
    if replacement.start < cursor || replacement.end < replacement.start {
      continue;
    }
    if replacement.end > source.len() {
      continue;
    }
    out.push_str(&source[cursor..replacement.start]);
    out.push_str(&replacement.content);
    cursor = replacement.end;
  }
  out.push_str(&source[cursor..]);
  out
}

/// Apply `patch` to the first balanced `tag` element starting at `marker`.
/// Unchanged when the marker or its closing tag is missing.
pub fn patch_balanced_element_by_start_marker<F>(source: &str, marker: &str, tag: &str, patch: F) -> String
where
  F: FnOnce(&str) -> String,
{
  let Some(start) = source.find(marker) else {
    return source.to_string();
  };
  let Some(range) = find_balanced_element_range(source, start, tag) else {
    return source.to_string();
  };
  splice(source, range, &patch(range.slice(source)))
}

/// Replace `range` in `source` with `content`.
pub fn splice(source: &str, range: Range, content: &str) -> String {
  let mut out = String::with_capacity(source.len() + content.len());
  out.push_str(&source[..range.start]);
  out.push_str(content);
  out.push_str(&source[range.end..]);
  out
}
