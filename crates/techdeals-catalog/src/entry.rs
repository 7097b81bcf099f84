use std::sync::Arc;

use rust_decimal::Decimal;
use techdeals_core::Product;

/// A product as held by the catalog: the raw record plus values parsed once
/// at ingestion so filters never re-parse display strings.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub product: Product,
    /// Trimmed, non-empty title.
    pub title: String,
    pub new_price: Option<Decimal>,
    pub old_price: Option<Decimal>,
    /// Raw category tokens, trimmed and lowercased.
    pub category_tokens: Vec<String>,
    /// Source file the record came from.
    pub file: Arc<str>,
}

impl CatalogEntry {
    /// Builds an entry, or `None` when the record has no usable title.
    #[must_use]
    pub fn from_product(product: Product, file: Arc<str>) -> Option<Self> {
        let title = product.trimmed_title()?.to_string();
        let new_price = product.new_price_amount();
        let old_price = product.old_price_amount();
        let category_tokens = product
            .category_tokens()
            .map(str::to_lowercase)
            .collect();

        Some(Self {
            product,
            title,
            new_price,
            old_price,
            category_tokens,
            file,
        })
    }
}

/// Result of ingesting one source file.
#[derive(Debug)]
pub struct IngestedFile {
    pub entries: Vec<CatalogEntry>,
    pub records: usize,
    pub dropped: usize,
}

/// Converts raw records from `file` into entries, dropping untitled ones.
#[must_use]
pub fn ingest(file: &str, products: Vec<Product>) -> IngestedFile {
    let file: Arc<str> = Arc::from(file);
    let records = products.len();
    let entries: Vec<CatalogEntry> = products
        .into_iter()
        .filter_map(|p| CatalogEntry::from_product(p, Arc::clone(&file)))
        .collect();
    let dropped = records - entries.len();

    if dropped > 0 {
        tracing::warn!(file = %file, dropped, "dropped product records without a title");
    }

    IngestedFile {
        entries,
        records,
        dropped,
    }
}
