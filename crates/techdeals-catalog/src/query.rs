//! The listing filter pipeline and pagination.

use serde::Serialize;
use techdeals_core::categories::resolve;
use techdeals_core::{CategoryMapping, CategoryPolicy, PriceRange, ProductFilters};

use crate::entry::CatalogEntry;

pub const DEFAULT_PAGE_LIMIT: usize = 12;

/// Arguments of a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number. Page 0 behaves like page 1.
    pub page: usize,
    pub limit: usize,
    pub filters: ProductFilters,
    /// Cap applied to the match count before pagination. Overrides the
    /// catalog-wide cap when set; `Some(0)` means uncapped.
    pub max_products: Option<usize>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            filters: ProductFilters::default(),
            max_products: None,
        }
    }
}

/// One page of results and the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    /// `ceil(total / limit)`, or 0 when `limit` is 0.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Slices `items` to `[(page-1)*limit, (page-1)*limit + limit)`.
pub fn paginate<T>(items: impl IntoIterator<Item = T>, total: usize, page: usize, limit: usize) -> Page<T> {
    let start = page.saturating_sub(1).saturating_mul(limit);
    Page {
        items: items.into_iter().skip(start).take(limit).collect(),
        total,
        page,
        limit,
    }
}

#[derive(Debug)]
enum CategoryFilter<'a> {
    Any,
    Mapping(&'a CategoryMapping),
    Nothing,
}

/// Compiled filter criteria for one listing.
#[derive(Debug)]
pub struct Matcher<'a> {
    category: CategoryFilter<'a>,
    search: Option<String>,
    price_range: Option<PriceRange>,
}

impl<'a> Matcher<'a> {
    #[must_use]
    pub fn new(
        filters: &ProductFilters,
        mappings: &'a [CategoryMapping],
        policy: CategoryPolicy,
    ) -> Self {
        let category = match filters.active_category() {
            None => CategoryFilter::Any,
            Some(requested) => match resolve(mappings, requested) {
                Some(mapping) => CategoryFilter::Mapping(mapping),
                None => {
                    tracing::debug!(category = requested, %policy, "category did not resolve");
                    match policy {
                        CategoryPolicy::Strict => CategoryFilter::Nothing,
                        CategoryPolicy::Permissive => CategoryFilter::Any,
                    }
                }
            },
        };

        Self {
            category,
            search: filters.search_term(),
            price_range: filters.price_range,
        }
    }

    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.matches_category(entry) && self.matches_search(entry) && self.matches_price(entry)
    }

    fn matches_category(&self, entry: &CatalogEntry) -> bool {
        match self.category {
            CategoryFilter::Any => true,
            CategoryFilter::Nothing => false,
            CategoryFilter::Mapping(mapping) => {
                mapping.matches_tokens(entry.category_tokens.iter().map(String::as_str))
            }
        }
    }

    fn matches_search(&self, entry: &CatalogEntry) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let product = &entry.product;
        product
            .title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(term))
            || product.categories.to_lowercase().contains(term)
            || product.description_html.to_lowercase().contains(term)
    }

    fn matches_price(&self, entry: &CatalogEntry) -> bool {
        match self.price_range {
            None => true,
            Some(range) => entry.new_price.is_some_and(|price| range.contains(price)),
        }
    }
}
