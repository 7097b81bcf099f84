//! Marketplace affiliate links.
//!
//! Product URLs from the scrape are rewritten into tagged short links so that
//! click-throughs earn commission.

use std::sync::LazyLock;

use regex::Regex;

/// Associate tag used when no `TECHDEALS_AFFILIATE_TAG` override is set.
pub const DEFAULT_AFFILIATE_TAG: &str = "a03d1843-20";

static ASIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})(?:/|\?|$)").expect("valid ASIN regex")
});

/// Extracts the 10-character product identifier (ASIN) from a `/dp/` or
/// `/gp/product/` URL path segment.
#[must_use]
pub fn extract_asin(url: &str) -> Option<&str> {
    ASIN_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Rewrites a marketplace product URL into a tagged affiliate link.
///
/// URLs without a recognizable identifier are returned unchanged.
#[must_use]
pub fn affiliate_link(url: &str, tag: &str) -> String {
    match extract_asin(url) {
        Some(asin) => format!(
            "https://www.amazon.com/dp/{asin}?th=1&linkCode=ll1&tag={tag}&language=en_US&ref_=as_li_ss_tl"
        ),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_asin_from_dp_path() {
        assert_eq!(
            extract_asin("https://www.amazon.com/Echo-Dot/dp/B09B8V1LZ3/ref=sr_1_1"),
            Some("B09B8V1LZ3")
        );
    }

    #[test]
    fn extracts_asin_from_gp_product_path_with_query() {
        assert_eq!(
            extract_asin("https://www.amazon.com/gp/product/B0C1234567?psc=1"),
            Some("B0C1234567")
        );
    }

    #[test]
    fn extracts_asin_at_end_of_url() {
        assert_eq!(
            extract_asin("https://www.amazon.com/dp/B0ABCDEFGH"),
            Some("B0ABCDEFGH")
        );
    }

    #[test]
    fn rejects_lowercase_or_wrong_length_identifiers() {
        assert_eq!(extract_asin("https://www.amazon.com/dp/b09b8v1lz3"), None);
        assert_eq!(extract_asin("https://www.amazon.com/dp/B09B8V1LZ"), None);
        assert_eq!(extract_asin("https://www.amazon.com/dp/B09B8V1LZ3X"), None);
    }

    #[test]
    fn affiliate_link_rewrites_with_tag() {
        assert_eq!(
            affiliate_link("https://www.amazon.com/x/dp/B09B8V1LZ3/", "shop-20"),
            "https://www.amazon.com/dp/B09B8V1LZ3?th=1&linkCode=ll1&tag=shop-20&language=en_US&ref_=as_li_ss_tl"
        );
    }

    #[test]
    fn affiliate_link_passes_through_unrecognized_urls() {
        let url = "https://www.example.com/products/widget";
        assert_eq!(affiliate_link(url, DEFAULT_AFFILIATE_TAG), url);
    }
}
