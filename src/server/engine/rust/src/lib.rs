/* src/server/engine/rust/src/lib.rs */

pub mod content;
pub mod copy;
pub mod document;
pub mod error;
pub mod manifest;
pub mod patch;
mod sections;
pub mod seo;

#[cfg(test)]
mod tests;

// Public API re-exports
pub use content::{ResolvedContent, SectionContent, resolve_value};
pub use document::{
  DEFAULT_STATIC_PREFIX_FROM, DEFAULT_STATIC_PREFIX_TO, Injections, RenderOptions, RenderedDocument, load_site_content,
  read_snapshot, render_document,
};
pub use error::{ManifestError, MirrorError};
pub use manifest::{ManifestCache, SharedManifestCache};
pub use patch::{PatchFlags, PatchOutcome, PatchReport, apply_content_patches, split_at_first_script};
pub use seo::{apply_seo, upsert_canonical_link, upsert_meta_tag, upsert_title};
