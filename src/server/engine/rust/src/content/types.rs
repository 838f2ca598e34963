/* src/server/engine/rust/src/content/types.rs */

use serde::{Deserialize, Serialize};

use super::SectionContent;

macro_rules! section {
  ($ty:ident, $key:literal) => {
    impl SectionContent for $ty {
      const KEY: &'static str = $key;
    }
  };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
  pub title_line1: String,
  pub title_line2: String,
  pub description: String,
  pub primary_cta_label: String,
}
section!(HeroContent, "hero");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerItem {
  pub label: String,
  pub image_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerPanelContent {
  pub title_line1: String,
  pub title_line2: String,
  pub primary_cta_label: String,
  pub items: Vec<BiomarkerItem>,
}
section!(BiomarkerPanelContent, "biomarkerPanel");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCard {
  pub alt: String,
  pub title_line1: String,
  pub title_line2: String,
  pub href: String,
  pub image_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionCard {
  pub alt: String,
  pub title_line1: String,
  pub title_line2: String,
  pub href: String,
  pub image_path: String,
  pub cta_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
  pub value: String,
  pub line1: String,
  pub line2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePanelContent {
  pub card_cta_label: String,
  pub cards: Vec<FeatureCard>,
  pub heading_line1: String,
  pub heading_line2: String,
  pub description: String,
  pub stat1: Stat,
  pub stat2: Stat,
  pub prescription_card: PrescriptionCard,
  pub care_heading_line1: String,
  pub care_heading_line2: String,
  pub care_description: String,
  pub testimonial_alt: String,
  pub badge_title: String,
  pub badge_status: String,
}
section!(FeaturePanelContent, "featurePanel");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
  pub thumbnail_alt: String,
  pub profile_alt: String,
  pub handle: String,
  pub meta: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCard {
  pub profile_alt: String,
  pub name: String,
  pub quote: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustSectionContent {
  pub heading_line1: String,
  pub heading_line2: String,
  pub member_label: String,
  pub read_more_label: String,
  pub video_cards: Vec<VideoCard>,
  pub text_cards: Vec<TextCard>,
}
section!(TrustSectionContent, "trustSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCenterContent {
  pub heading_line1: String,
  pub heading_line2: String,
  pub loading_animation_label: String,
  pub description: String,
  pub cta_label: String,
  pub app_image_alt: String,
}
section!(CommandCenterContent, "commandCenterSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
  pub title: String,
  pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OurProcessContent {
  pub image_alt: String,
  pub heading_line1: String,
  pub heading_line2: String,
  pub steps: Vec<ProcessStep>,
}
section!(OurProcessContent, "ourProcessSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPricing {
  pub one_time_price: String,
  pub recurring_price: String,
  pub one_time_label: String,
  pub recurring_label: String,
  pub discount_percentage: String,
  pub twice_annually_billing_text: String,
  pub annually_billing_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeature {
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanGroup {
  pub category_name: String,
  pub features: Vec<PlanFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLink {
  pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  pub name: String,
  pub name_style: String,
  pub tagline: String,
  pub is_popular: bool,
  pub pricing: PlanPricing,
  pub feature: Vec<PlanGroup>,
  pub restriction: Vec<PlanGroup>,
  pub link: PlanLink,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoosePathContent {
  pub title: String,
  pub subtitle: String,
  pub plans: Vec<Plan>,
}
section!(ChoosePathContent, "choosePathSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
  pub question: String,
  pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqContent {
  pub heading_line1: String,
  pub heading_line2: String,
  pub items: Vec<FaqItem>,
  pub card_image_alt: String,
  pub support_title: String,
  pub support_description: String,
  pub support_cta_label: String,
  pub support_cta_href: String,
}
section!(FaqContent, "faqSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionContent {
  pub image_alt: String,
  pub image_path: String,
  pub name: String,
  pub role: String,
  pub heading_line1: String,
  pub heading_line2: String,
  pub description: String,
  pub cta_label: String,
  pub cta_href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
  pub image_path: String,
  pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryContent {
  pub heading_line1: String,
  pub heading_line2: String,
  pub cta_label: String,
  pub cta_href: String,
  pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSectionContent {
  pub mission: MissionContent,
  pub gallery: GalleryContent,
}
section!(MissionSectionContent, "missionSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterContent {
  pub background_image_path: String,
  pub background_image_alt: String,
  pub heading_line1: String,
  pub heading_line2: String,
  pub description: String,
  pub cta_label: String,
  pub cta_href: String,
}
section!(NewsletterContent, "newsletterSection");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLink {
  pub label: String,
  pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterContent {
  pub logo_alt: String,
  pub subscription_text: String,
  pub email_placeholder: String,
  pub subscribe_label: String,
  pub follow_us_label: String,
  pub support_title: String,
  pub support_links: Vec<FooterLink>,
  pub about_title: String,
  pub about_links: Vec<FooterLink>,
  pub legal_disclaimer: String,
  pub card_image_alt: String,
  pub card_desktop_image_path: String,
  pub card_mobile_image_path: String,
  pub app_prompt: String,
  pub app_store_alt: String,
  pub app_store_href: String,
  pub app_store_image_path: String,
  pub google_play_alt: String,
  pub google_play_href: String,
  pub google_play_image_path: String,
  pub copyright_text: String,
}
section!(FooterContent, "footerSection");
