/* src/server/engine/rust/src/seo.rs */

use std::sync::OnceLock;

use mirror_injector::{escape_html, escape_regex, set_attribute_in_tag};
use regex::{NoExpand, Regex};
use serde_json::Value;
use url::Url;

const DEFAULT_BUSINESS_NAME: &str = "English Plumber";
const DEFAULT_BASE_CITY: &str = "Medemblik";
const DEFAULT_WHATSAPP_NUMBER: &str = "+31 6 428 699 31";
const DEFAULT_CANONICAL_ORIGIN: &str = "https://englishplumber.nl/";
const DEFAULT_OG_IMAGE: &str = "/IMG_8233.PNG";

fn title_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?is)<title\b[^>]*>.*?</title>").unwrap())
}

fn canonical_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?i)<link\b[^>]*\brel\s*=\s*(?:"canonical"|'canonical')[^>]*>"#).unwrap())
}

/// Replace the first `<title>` element, or prepend one.
pub fn upsert_title(head: &str, title: &str) -> String {
  let tag = format!("<title>{}</title>", escape_html(title));
  if title_re().is_match(head) {
    return title_re().replace(head, NoExpand(&tag)).into_owned();
  }
  format!("{tag}{head}")
}

/// Set `content` on the first `<meta attr="value">`, or append a new tag.
pub fn upsert_meta_tag(head: &str, attr: &str, value: &str, content: &str) -> String {
  let value_re = escape_regex(value);
  let pattern = format!(r#"(?i)<meta\b[^>]*\b{}\s*=\s*(?:"{value_re}"|'{value_re}')[^>]*>"#, escape_regex(attr));
  if let Ok(re) = Regex::new(&pattern)
    && re.is_match(head)
  {
    return re.replace(head, |caps: &regex::Captures| set_attribute_in_tag(&caps[0], "content", content)).into_owned();
  }
  format!(r#"{head}<meta {attr}="{}" content="{}"/>"#, escape_html(value), escape_html(content))
}

/// Set `href` on the `rel="canonical"` link, or append one.
pub fn upsert_canonical_link(head: &str, href: &str) -> String {
  if canonical_re().is_match(head) {
    return canonical_re().replace(head, |caps: &regex::Captures| set_attribute_in_tag(&caps[0], "href", href)).into_owned();
  }
  format!(r#"{head}<link rel="canonical" href="{}"/>"#, escape_html(href))
}

/// Head tag values derived from the site content, with every field filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoValues {
  pub business_name: String,
  pub title: String,
  pub description: String,
  pub homepage_url: String,
  pub og_image: String,
}

fn non_empty<'a>(site: &'a Value, key: &str) -> Option<&'a str> {
  site.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Parse `value` as an absolute URL in its serialized form, else `fallback`.
fn normalize_absolute_url(value: Option<&str>, fallback: &str) -> String {
  value.and_then(|raw| Url::parse(raw).ok()).map_or_else(|| fallback.to_string(), String::from)
}

impl SeoValues {
  pub fn resolve(site: &Value) -> Self {
    let business_name = non_empty(site, "businessName").unwrap_or(DEFAULT_BUSINESS_NAME);
    let city = non_empty(site, "baseCity").unwrap_or(DEFAULT_BASE_CITY);
    let whatsapp = non_empty(site, "whatsappNumber").unwrap_or(DEFAULT_WHATSAPP_NUMBER);

    let canonical_origin = normalize_absolute_url(non_empty(site, "canonicalOrigin"), DEFAULT_CANONICAL_ORIGIN);
    let homepage_url = normalize_absolute_url(non_empty(site, "homepageUrl"), &canonical_origin);

    let title = non_empty(site, "seoTitle")
      .map_or_else(|| format!("{business_name} | Plumbing & Heating in {city}"), String::from);
    let description = non_empty(site, "seoDescription").map_or_else(
      || {
        format!(
          "{business_name} is a friendly local plumber in {city}. Boiler servicing, radiator repairs, \
           tap repairs, and general plumbing handyman work. WhatsApp {whatsapp}."
        )
      },
      String::from,
    );

    Self {
      business_name: business_name.to_string(),
      title,
      description,
      homepage_url,
      og_image: non_empty(site, "ogImage").unwrap_or(DEFAULT_OG_IMAGE).to_string(),
    }
  }
}

/// Write title, description, Open Graph, Twitter card and canonical tags.
pub fn apply_seo(head: &str, site: &Value) -> String {
  let seo = SeoValues::resolve(site);
  let metas = [
    ("name", "description", seo.description.as_str()),
    ("property", "og:title", seo.title.as_str()),
    ("property", "og:description", seo.description.as_str()),
    ("property", "og:url", seo.homepage_url.as_str()),
    ("property", "og:site_name", seo.business_name.as_str()),
    ("property", "og:image", seo.og_image.as_str()),
    ("name", "twitter:title", seo.title.as_str()),
    ("name", "twitter:description", seo.description.as_str()),
    ("name", "twitter:image", seo.og_image.as_str()),
  ];

  let out = upsert_title(head, &seo.title);
  let out = metas.iter().fold(out, |acc, (attr, value, content)| upsert_meta_tag(&acc, attr, value, content));
  upsert_canonical_link(&out, &seo.homepage_url)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  // -- upsert_title --

  #[test]
  fn title_replaced() {
    let out = upsert_title(r#"<meta charset="utf-8"/><TITLE data-x="1">Old</TITLE>"#, "A & B");
    assert_eq!(out, r#"<meta charset="utf-8"/><title>A &amp; B</title>"#);
  }

  #[test]
  fn title_prepended_when_missing() {
    assert_eq!(upsert_title("<meta/>", "T"), "<title>T</title><meta/>");
  }

  // -- upsert_meta_tag --

  #[test]
  fn meta_content_updated_in_place() {
    let head = r#"<meta name="description" content="old"/><meta property="og:title" content="x"/>"#;
    let out = upsert_meta_tag(head, "name", "description", "new \"quoted\"");
    assert_eq!(out, r#"<meta name="description" content="new &quot;quoted&quot;"/><meta property="og:title" content="x"/>"#);
  }

  #[test]
  fn meta_single_quoted_value_matches() {
    let out = upsert_meta_tag("<meta property='og:url'>", "property", "og:url", "https://a.nl/");
    assert_eq!(out, r#"<meta property='og:url' content="https://a.nl/">"#);
  }

  #[test]
  fn meta_appended_when_missing() {
    let out = upsert_meta_tag("<title>T</title>", "name", "twitter:image", "/x.png");
    assert_eq!(out, r#"<title>T</title><meta name="twitter:image" content="/x.png"/>"#);
  }

  // -- upsert_canonical_link --

  #[test]
  fn canonical_updated_or_appended() {
    let out = upsert_canonical_link(r#"<link href="/old" rel="canonical">"#, "https://a.nl/");
    assert_eq!(out, r#"<link href="https://a.nl/" rel="canonical">"#);
    assert_eq!(upsert_canonical_link("", "https://a.nl/"), r#"<link rel="canonical" href="https://a.nl/"/>"#);
  }

  // -- SeoValues --

  #[test]
  fn defaults_fill_every_field() {
    let seo = SeoValues::resolve(&json!({}));
    assert_eq!(seo.title, "English Plumber | Plumbing & Heating in Medemblik");
    assert!(seo.description.ends_with("WhatsApp +31 6 428 699 31."));
    assert_eq!(seo.homepage_url, "https://englishplumber.nl/");
    assert_eq!(seo.og_image, "/IMG_8233.PNG");
  }

  #[test]
  fn invalid_urls_fall_back() {
    let seo = SeoValues::resolve(&json!({"canonicalOrigin": "https://example.nl", "homepageUrl": "not a url"}));
    assert_eq!(seo.homepage_url, "https://example.nl/");

    let seo = SeoValues::resolve(&json!({"canonicalOrigin": "/relative", "businessName": ""}));
    assert_eq!(seo.homepage_url, "https://englishplumber.nl/");
    assert_eq!(seo.business_name, "English Plumber");
  }

  #[test]
  fn explicit_title_and_description_win() {
    let seo = SeoValues::resolve(&json!({"seoTitle": "Plumber Hoorn", "seoDescription": "Fast help.", "baseCity": "Hoorn"}));
    assert_eq!(seo.title, "Plumber Hoorn");
    assert_eq!(seo.description, "Fast help.");
  }

  // -- apply_seo --

  #[test]
  fn apply_writes_all_tags() {
    let head = r#"<title>Geviti</title><meta name="description" content="old"/>"#;
    let out = apply_seo(head, &json!({"businessName": "Acme", "baseCity": "Hoorn", "ogImage": "/og.png"}));
    assert!(out.starts_with("<title>Acme | Plumbing &amp; Heating in Hoorn</title>"));
    assert!(out.contains(r#"<meta name="description" content="Acme is a friendly local plumber in Hoorn."#));
    for tag in [
      r#"<meta property="og:title" content="Acme | Plumbing &amp; Heating in Hoorn"/>"#,
      r#"<meta property="og:url" content="https://englishplumber.nl/"/>"#,
      r#"<meta property="og:site_name" content="Acme"/>"#,
      r#"<meta property="og:image" content="/og.png"/>"#,
      r#"<meta name="twitter:image" content="/og.png"/>"#,
      r#"<link rel="canonical" href="https://englishplumber.nl/"/>"#,
    ] {
      assert!(out.contains(tag), "missing {tag}");
    }
    assert_eq!(out.matches("<title>").count(), 1);
  }
}
