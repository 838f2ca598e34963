/* src/server/injector/rust/src/lib.rs */

mod animated;
mod chunk;
mod escape;
mod log;
mod media;
mod range;
mod tag;
mod visit;

pub use animated::patch_animated_text_element;
pub use chunk::{
  CHUNK_END, CHUNK_START, build_encoded_needle_variants, encode_script_value, patch_chunk_by_needle, patch_chunk_lines,
  patch_payload_window, replace_escaped_script_field_value, replace_escaped_script_string_value,
};
pub use escape::{
  decode_json_fragment, encode_json_fragment, escape_html, escape_regex, normalize_whitespace,
  tokenize_preserving_whitespace,
};
pub use log::{SLOT_PREFIX, SlotLog};
pub use media::{MEDIA_REQUEST_PREFIX, build_media_key_variants, build_media_path_replacement_pairs, replace_media_path};
pub use range::{
  Range, Replacement, find_balanced_element_range, find_balanced_element_ranges_by_start_marker,
  find_balanced_element_ranges_from, find_balanced_symbol_range, patch_balanced_element_by_start_marker,
  replace_ranges_by_offsets, splice,
};
pub use tag::{
  AnchorUpdate, patch_anchor_node, patch_anchors_by_index, patch_first_span_text, read_attribute,
  remove_attribute_from_tag, set_attribute_in_tag,
};
pub use visit::{find_all, find_first, find_first_mut, for_each_match_mut, str_field};
