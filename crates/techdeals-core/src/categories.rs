use serde::{Deserialize, Serialize};

/// A curated storefront category and the raw scrape tokens that map onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMapping {
    pub display_name: String,
    /// Lowercase raw category tokens, e.g. `["kitchen", "cookware"]`.
    #[serde(default)]
    pub similar_categories: Vec<String>,
}

/// The `{slug, name}` pair rendered in category navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub slug: String,
    pub name: String,
}

impl CategoryMapping {
    /// URL slug: the lowercased display name with whitespace runs turned into `-`.
    #[must_use]
    pub fn slug(&self) -> String {
        self.display_name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Case-insensitive match against the display name or the slug.
    #[must_use]
    pub fn matches_name(&self, requested: &str) -> bool {
        let requested = requested.trim().to_lowercase();
        self.display_name.to_lowercase() == requested || self.slug() == requested
    }

    /// Returns `true` if any of the product's raw tokens, trimmed and
    /// lowercased, is one of this mapping's similar categories.
    pub fn matches_tokens<'a, I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens.into_iter().any(|token| {
            let token = token.trim().to_lowercase();
            self.similar_categories.iter().any(|c| *c == token)
        })
    }

    #[must_use]
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            slug: self.slug(),
            name: self.display_name.clone(),
        }
    }
}

/// Finds the mapping for a requested category name or slug.
#[must_use]
pub fn resolve<'a>(mappings: &'a [CategoryMapping], requested: &str) -> Option<&'a CategoryMapping> {
    mappings.iter().find(|m| m.matches_name(requested))
}
