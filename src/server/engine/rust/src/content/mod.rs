/* src/server/engine/rust/src/content/mod.rs */

mod types;

use std::sync::OnceLock;

use mirror_injector::AnchorUpdate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use types::*;

const DEFAULTS_JSON: &str = include_str!("defaults.json");

/// Field-complete default templates, keyed by section name.
pub fn defaults() -> &'static Value {
  static DEFAULTS: OnceLock<Value> = OnceLock::new();
  DEFAULTS.get_or_init(|| serde_json::from_str(DEFAULTS_JSON).unwrap_or_else(|_| Value::Object(Map::new())))
}

/// Merge `over` into `default`, keeping the default's shape.
///
/// Strings accept only non-blank strings, booleans and numbers only their own
/// type. Objects resolve per default key and drop unknown keys. Lists resolve by
/// index against the default list, so the result is always default-length.
pub fn resolve_value(default: &Value, over: Option<&Value>) -> Value {
  match default {
    Value::String(_) => match over {
      Some(Value::String(s)) if !s.trim().is_empty() => Value::String(s.clone()),
      _ => default.clone(),
    },
    Value::Bool(_) => match over {
      Some(v @ Value::Bool(_)) => v.clone(),
      _ => default.clone(),
    },
    Value::Number(_) => match over {
      Some(v @ Value::Number(_)) => v.clone(),
      _ => default.clone(),
    },
    Value::Object(fields) => {
      let over = over.and_then(Value::as_object);
      let resolved = fields
        .iter()
        .map(|(key, field_default)| (key.clone(), resolve_value(field_default, over.and_then(|o| o.get(key)))))
        .collect::<Map<String, Value>>();
      Value::Object(resolved)
    }
    Value::Array(items) => {
      let Some(over) = over.and_then(Value::as_array) else {
        return default.clone();
      };
      let resolved = items.iter().enumerate().map(|(i, item_default)| resolve_value(item_default, over.get(i))).collect();
      Value::Array(resolved)
    }
    Value::Null => default.clone(),
  }
}

/// Typed, fully resolved content for one section key.
pub trait SectionContent: DeserializeOwned + Default {
  const KEY: &'static str;

  fn resolve(site: &Value) -> Self {
    let default = defaults().get(Self::KEY).unwrap_or(&Value::Null);
    let resolved = resolve_value(default, site.get(Self::KEY));
    serde_json::from_value(resolved).unwrap_or_default()
  }

  fn defaults() -> Self {
    Self::resolve(&Value::Null)
  }
}

fn non_blank_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
  value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn non_empty_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
  value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub const DEFAULT_WHATSAPP_NUMBER: &str = "+31 6 428 699 31";

/// Header slots. The header has no default template: nav items come only from
/// the override and the two CTAs have fixed fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderContent {
  pub nav_items: Vec<AnchorUpdate>,
  pub primary_cta: AnchorUpdate,
  pub secondary_cta: AnchorUpdate,
}

impl HeaderContent {
  pub fn resolve(site: &Value) -> Self {
    let header = site.get("header").filter(|h| h.is_object());
    let field = |key: &str| header.and_then(|h| h.get(key));

    let nav_items = field("navItems")
      .and_then(Value::as_array)
      .map(|items| {
        items
          .iter()
          .filter_map(|item| {
            let label = non_blank_str(item.get("label"))?;
            let href = non_blank_str(item.get("href"))?;
            Some(AnchorUpdate::new(label, href, false))
          })
          .collect()
      })
      .unwrap_or_default();

    let number = non_empty_str(site.get("whatsappNumber")).unwrap_or(DEFAULT_WHATSAPP_NUMBER);
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    let whatsapp_fallback = if digits.is_empty() { "#".to_string() } else { format!("https://wa.me/{digits}") };

    let primary_cta = AnchorUpdate::new(
      non_empty_str(field("primaryCtaLabel")).unwrap_or("WhatsApp"),
      non_empty_str(field("whatsAppHref")).map_or(whatsapp_fallback, str::to_string),
      true,
    );
    let secondary_cta = AnchorUpdate::new(
      non_empty_str(field("secondaryCtaLabel")).unwrap_or("Free Quote"),
      non_empty_str(field("secondaryCtaHref")).unwrap_or("#free-quote"),
      false,
    );

    Self { nav_items, primary_cta, secondary_cta }
  }
}

/// Every section resolved against its defaults for one render call.
#[derive(Debug, Clone)]
pub struct ResolvedContent {
  pub header: HeaderContent,
  pub hero: HeroContent,
  pub biomarker: BiomarkerPanelContent,
  pub feature_panel: FeaturePanelContent,
  pub trust: TrustSectionContent,
  pub command_center: CommandCenterContent,
  pub our_process: OurProcessContent,
  pub choose_path: ChoosePathContent,
  pub faq: FaqContent,
  pub mission: MissionSectionContent,
  pub newsletter: NewsletterContent,
  pub footer: FooterContent,
}

impl ResolvedContent {
  pub fn resolve(site: &Value) -> Self {
    Self {
      header: HeaderContent::resolve(site),
      hero: HeroContent::resolve(site),
      biomarker: BiomarkerPanelContent::resolve(site),
      feature_panel: FeaturePanelContent::resolve(site),
      trust: TrustSectionContent::resolve(site),
      command_center: CommandCenterContent::resolve(site),
      our_process: OurProcessContent::resolve(site),
      choose_path: ChoosePathContent::resolve(site),
      faq: FaqContent::resolve(site),
      mission: MissionSectionContent::resolve(site),
      newsletter: NewsletterContent::resolve(site),
      footer: FooterContent::resolve(site),
    }
  }

  pub fn defaults() -> Self {
    Self::resolve(&Value::Null)
  }
}
