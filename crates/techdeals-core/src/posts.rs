use serde::{Deserialize, Serialize};

use crate::products::Product;

/// A blog post with the products it recommends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    pub title: String,
    /// Post body as HTML.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    /// Publication date as written by the content pipeline, e.g. `"2025-01-14"`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub og_title: String,
    #[serde(default)]
    pub og_description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub related_products: Vec<Product>,
}

impl Post {
    /// Image for social cards: the first related product's image, if any.
    #[must_use]
    pub fn featured_image(&self) -> Option<&str> {
        self.related_products
            .first()
            .map(|p| p.img_url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// First post category, falling back to `"Blog"`.
    #[must_use]
    pub fn primary_category(&self) -> &str {
        self.categories.first().map_or("Blog", String::as_str)
    }
}
