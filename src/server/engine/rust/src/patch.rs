/* src/server/engine/rust/src/patch.rs */

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::content::ResolvedContent;
use crate::copy::apply_copy_replacements_outside_blocked_tags;
use crate::sections::{
  PatchContext, biomarker, choose_path, command_center, faq, feature_panel, footer, gallery, header, hero, mission,
  newsletter, our_process, trust,
};
use crate::seo::apply_seo;

fn script_open_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<script\b").unwrap())
}

/// Feature switches read from the site content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchFlags {
  /// Exact and regex copy replacements outside script, style and noscript.
  pub copy_rewrite: bool,
  /// Section slot patching of markup and payload.
  pub slot_rewrite: bool,
}

impl Default for PatchFlags {
  fn default() -> Self {
    Self { copy_rewrite: false, slot_rewrite: true }
  }
}

impl PatchFlags {
  pub fn from_site(site: &Value) -> Self {
    let defaults = Self::default();
    let flag = |key: &str, fallback: bool| site.get(key).and_then(Value::as_bool).unwrap_or(fallback);
    Self {
      copy_rewrite: flag("enableServerCopyRewrite", defaults.copy_rewrite),
      slot_rewrite: flag("enableServerHeaderSlotRewrite", defaults.slot_rewrite),
    }
  }
}

/// Warnings and matched containers of one render call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchReport {
  pub warnings: Vec<String>,
  pub matched_sections: Vec<&'static str>,
}

impl PatchReport {
  /// True when slot patching ran but no section container was found, which
  /// means the snapshot no longer has the captured shape.
  pub fn is_stale(&self) -> bool {
    self.matched_sections.is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
  pub head_inner: String,
  pub body_inner: String,
  pub report: PatchReport,
}

/// Split the body at the first `<script` (any case): markup before it, the
/// payload scripts and tail after. No script means an empty payload.
pub fn split_at_first_script(body: &str) -> (&str, &str) {
  match script_open_re().find(body) {
    Some(m) => body.split_at(m.start()),
    None => (body, ""),
  }
}

fn patch_markup(markup: &str, content: &ResolvedContent, ctx: &mut PatchContext) -> String {
  let out = header::patch_markup(markup, &content.header, ctx);
  let out = hero::patch_markup(&out, &content.hero, ctx);
  let out = biomarker::patch_markup(&out, &content.biomarker, ctx);
  let out = feature_panel::patch_markup(&out, &content.feature_panel, ctx);
  let out = trust::patch_markup(&out, &content.trust, ctx);
  let out = command_center::patch_markup(&out, &content.command_center, ctx);
  let out = our_process::patch_markup(&out, &content.our_process, ctx);
  let out = choose_path::patch_markup(&out, &content.choose_path, ctx);
  let out = faq::patch_markup(&out, &content.faq, ctx);
  let out = mission::patch_markup(&out, &content.mission, ctx);
  let out = gallery::patch_markup(&out, &content.mission, ctx);
  let out = newsletter::patch_markup(&out, &content.newsletter, ctx);
  footer::patch_markup(&out, &content.footer, ctx)
}

fn patch_payload(payload: &str, content: &ResolvedContent, ctx: &mut PatchContext) -> String {
  let out = header::patch_payload(payload, &content.header, ctx);
  let out = hero::patch_payload(&out, &content.hero, ctx);
  let out = biomarker::patch_payload(&out, &content.biomarker, ctx);
  let out = feature_panel::patch_payload(&out, &content.feature_panel, ctx);
  let out = trust::patch_payload(&out, &content.trust, ctx);
  let out = command_center::patch_payload(&out, &content.command_center, ctx);
  let out = our_process::patch_payload(&out, &content.our_process, ctx);
  let out = choose_path::patch_payload(&out, &content.choose_path, ctx);
  let out = faq::patch_payload(&out, &content.faq, ctx);
  let out = mission::patch_payload(&out, &content.mission, ctx);
  let out = gallery::patch_payload(&out, &content.mission, ctx);
  let out = newsletter::patch_payload(&out, &content.newsletter, ctx);
  footer::patch_payload(&out, &content.footer, ctx)
}

/// Apply every configured content patch to a captured page.
///
/// Copy replacements (when enabled) run first on head and body. Slot patching
/// then rewrites the markup before the first script, and the payload after it
/// when there is one. The SEO head pass always runs last.
pub fn apply_content_patches(head_inner: &str, body_inner: &str, site: &Value) -> PatchOutcome {
  let flags = PatchFlags::from_site(site);

  let (head, mut body) = if flags.copy_rewrite {
    (
      apply_copy_replacements_outside_blocked_tags(head_inner, site),
      apply_copy_replacements_outside_blocked_tags(body_inner, site),
    )
  } else {
    (head_inner.to_string(), body_inner.to_string())
  };

  let mut ctx = PatchContext::new();
  if flags.slot_rewrite {
    let content = ResolvedContent::resolve(site);
    let (markup, payload) = split_at_first_script(&body);
    let markup = patch_markup(markup, &content, &mut ctx);
    let payload = if payload.is_empty() { String::new() } else { patch_payload(payload, &content, &mut ctx) };
    body = format!("{markup}{payload}");
  }

  tracing::debug!(warnings = ctx.log.len(), matched = ctx.matched.len(), "content patches applied");

  PatchOutcome {
    head_inner: apply_seo(&head, site),
    body_inner: body,
    report: PatchReport { warnings: ctx.log.into_warnings(), matched_sections: ctx.matched },
  }
}
