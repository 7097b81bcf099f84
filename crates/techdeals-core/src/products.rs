use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::money::parse_price;

/// Boilerplate phrases the marketplace scrape leaves inside descriptions.
const DESCRIPTION_BOILERPLATE: [&str; 3] =
    ["About this item", "See more product details", "Show more"];

const MAX_KEY_FEATURES: usize = 6;

static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][^.!?]*\.").expect("valid sentence regex"));

/// A discounted marketplace product, exactly as the offline scrape wrote it.
///
/// Field names on the wire keep the scrape's hyphenated keys. Missing or
/// `null` text fields load as empty strings; only `title` decides whether a
/// record is usable at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product-url", default, deserialize_with = "null_as_default")]
    pub product_url: String,
    /// `None` (or blank) marks an incomplete scrape; such records are never served.
    #[serde(default)]
    pub title: Option<String>,
    /// Pre-discount price display string, e.g. `"$199.99"`.
    #[serde(rename = "old-price", default, deserialize_with = "null_as_default")]
    pub old_price: String,
    /// Current price display string, e.g. `"$149.99"`.
    #[serde(rename = "new-price", default, deserialize_with = "null_as_default")]
    pub new_price: String,
    #[serde(rename = "img-url", default, deserialize_with = "null_as_default")]
    pub img_url: String,
    #[serde(rename = "img-alt", default, deserialize_with = "null_as_default")]
    pub img_alt: String,
    /// Raw pipe-delimited category tokens, e.g. `"Electronics|Gadgets"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: String,
    #[serde(rename = "description-html", default, deserialize_with = "null_as_default")]
    pub description_html: String,
    #[serde(rename = "meta-description", default, deserialize_with = "null_as_default")]
    pub meta_description: String,
    #[serde(rename = "meta-title", default, deserialize_with = "null_as_default")]
    pub meta_title: String,
    #[serde(rename = "discount-percent", default, deserialize_with = "null_as_default")]
    pub discount_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(
        rename = "review-count",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Product {
    /// Returns the title with surrounding whitespace removed, or `None` when
    /// the title is missing or blank.
    #[must_use]
    pub fn trimmed_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn new_price_amount(&self) -> Option<Decimal> {
        parse_price(&self.new_price)
    }

    #[must_use]
    pub fn old_price_amount(&self) -> Option<Decimal> {
        parse_price(&self.old_price)
    }

    /// Difference between the old and new price, when both parse.
    #[must_use]
    pub fn savings(&self) -> Option<Decimal> {
        let old = self.old_price_amount()?;
        let new = self.new_price_amount()?;
        Some((old - new).round_dp(2))
    }

    /// Individual category tokens, trimmed, in source order.
    pub fn category_tokens(&self) -> impl Iterator<Item = &str> {
        self.categories
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// First category token, used for breadcrumbs. Falls back to `"Deals"`.
    #[must_use]
    pub fn primary_category(&self) -> &str {
        self.category_tokens().next().unwrap_or("Deals")
    }

    /// Description with the scrape's boilerplate phrases removed.
    #[must_use]
    pub fn clean_description(&self) -> String {
        DESCRIPTION_BOILERPLATE
            .iter()
            .fold(self.description_html.clone(), |acc, phrase| {
                acc.replace(phrase, "")
            })
    }

    /// Up to six headline sentences pulled out of the description.
    ///
    /// A sentence starts at an uppercase ASCII letter and ends at the first
    /// `.` with no `!` or `?` in between. Sentences mentioning
    /// "About this item" are skipped.
    #[must_use]
    pub fn key_features(&self) -> Vec<String> {
        let cleaned = self
            .description_html
            .replace("Show more", "")
            .replace("See more product details", "");

        SENTENCE_RE
            .find_iter(cleaned.trim())
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty() && !s.contains("About this item"))
            .take(MAX_KEY_FEATURES)
            .map(ToOwned::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(title: Option<&str>) -> Product {
        Product {
            product_url: "https://www.amazon.com/dp/B09B8V1LZ3".to_string(),
            title: title.map(ToOwned::to_owned),
            old_price: "$49.99".to_string(),
            new_price: "$22.99".to_string(),
            img_url: "https://m.media-amazon.com/images/I/echo.jpg".to_string(),
            img_alt: "Echo Dot".to_string(),
            categories: "Electronics | Smart Home|Speakers".to_string(),
            description_html: "About this item Better sound. Show more Alexa can help. Why wait? \
                               See more product details"
                .to_string(),
            meta_description: String::new(),
            meta_title: String::new(),
            discount_percent: 54.0,
            rating: Some("4.7".to_string()),
            review_count: Some(1_024),
            badge: None,
            features: None,
        }
    }

    #[test]
    fn trimmed_title_strips_whitespace() {
        let product = make_product(Some("  Echo Dot  "));
        assert_eq!(product.trimmed_title(), Some("Echo Dot"));
    }

    #[test]
    fn trimmed_title_none_for_missing_or_blank() {
        assert_eq!(make_product(None).trimmed_title(), None);
        assert_eq!(make_product(Some("   ")).trimmed_title(), None);
    }

    #[test]
    fn savings_is_old_minus_new() {
        let product = make_product(Some("Echo Dot"));
        assert_eq!(product.savings(), Some(Decimal::new(2_700, 2)));
    }

    #[test]
    fn savings_none_when_price_unparseable() {
        let mut product = make_product(Some("Echo Dot"));
        product.old_price = "see price in cart".to_string();
        assert_eq!(product.savings(), None);
    }

    #[test]
    fn category_tokens_are_trimmed() {
        let product = make_product(Some("Echo Dot"));
        let tokens: Vec<&str> = product.category_tokens().collect();
        assert_eq!(tokens, vec!["Electronics", "Smart Home", "Speakers"]);
        assert_eq!(product.primary_category(), "Electronics");
    }

    #[test]
    fn primary_category_defaults_to_deals() {
        let mut product = make_product(Some("Echo Dot"));
        product.categories = String::new();
        assert_eq!(product.primary_category(), "Deals");
    }

    #[test]
    fn clean_description_removes_boilerplate() {
        let product = make_product(Some("Echo Dot"));
        let cleaned = product.clean_description();
        assert!(!cleaned.contains("About this item"));
        assert!(!cleaned.contains("Show more"));
        assert!(!cleaned.contains("See more product details"));
        assert!(cleaned.contains("Better sound."));
    }

    #[test]
    fn key_features_skips_about_and_question_sentences() {
        let product = make_product(Some("Echo Dot"));
        assert_eq!(product.key_features(), vec!["Alexa can help.".to_string()]);
    }

    #[test]
    fn key_features_caps_at_six() {
        let mut product = make_product(Some("Echo Dot"));
        product.description_html = "One. Two. Three. Four. Five. Six. Seven. Eight.".to_string();
        let features = product.key_features();
        assert_eq!(features.len(), 6);
        assert_eq!(features[0], "One.");
        assert_eq!(features[5], "Six.");
    }

    #[test]
    fn deserializes_hyphenated_keys() {
        let json = r#"{
            "product-url": "https://www.amazon.com/dp/B0ABCDEFGH",
            "title": "Wireless Mouse",
            "old-price": "$29.99",
            "new-price": "$19.99",
            "img-url": "https://example.com/mouse.jpg",
            "img-alt": "Mouse",
            "categories": "Computers|Accessories",
            "description-html": "<p>Smooth tracking.</p>",
            "meta-description": "A mouse",
            "meta-title": "Wireless Mouse",
            "discount-percent": 33
        }"#;
        let product: Product = serde_json::from_str(json).expect("valid product json");
        assert_eq!(product.trimmed_title(), Some("Wireless Mouse"));
        assert_eq!(product.new_price_amount(), Some(Decimal::new(1_999, 2)));
        assert!((product.discount_percent - 33.0).abs() < f64::EPSILON);
        assert!(product.review_count.is_none());
    }

    #[test]
    fn null_title_deserializes_as_none() {
        let product: Product =
            serde_json::from_str(r#"{"title": null, "new-price": "$5.00"}"#).expect("json");
        assert!(product.title.is_none());
        assert_eq!(product.trimmed_title(), None);
    }

    #[test]
    fn null_fields_load_as_defaults() {
        let json = r#"{
            "product-url": null,
            "title": null,
            "old-price": null,
            "new-price": null,
            "img-url": null,
            "img-alt": null,
            "categories": null,
            "description-html": null,
            "meta-description": null,
            "meta-title": null,
            "discount-percent": null,
            "rating": null,
            "review-count": null,
            "badge": null,
            "features": null
        }"#;
        let product: Product = serde_json::from_str(json).expect("nulls are tolerated");
        assert!(product.title.is_none());
        assert!(product.new_price.is_empty());
        assert!(product.categories.is_empty());
        assert!(product.discount_percent.abs() < f64::EPSILON);
        assert_eq!(product.primary_category(), "Deals");
    }
}
