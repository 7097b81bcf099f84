use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Fixed price buckets offered by the storefront filter sidebar.
///
/// Bounds are the literal comparisons the storefront has always used, so the
/// inner buckets share their edges: `$300.00` is in both `100-300` and
/// `300-500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "under-100")]
    Under100,
    #[serde(rename = "100-300")]
    From100To300,
    #[serde(rename = "300-500")]
    From300To500,
    #[serde(rename = "over-500")]
    Over500,
}

impl PriceRange {
    pub const ALL: [PriceRange; 4] = [
        PriceRange::Under100,
        PriceRange::From100To300,
        PriceRange::From300To500,
        PriceRange::Over500,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceRange::Under100 => "under-100",
            PriceRange::From100To300 => "100-300",
            PriceRange::From300To500 => "300-500",
            PriceRange::Over500 => "over-500",
        }
    }

    #[must_use]
    pub fn contains(self, price: Decimal) -> bool {
        let hundred = Decimal::ONE_HUNDRED;
        let three_hundred = Decimal::from(300);
        let five_hundred = Decimal::from(500);

        match self {
            PriceRange::Under100 => price < hundred,
            PriceRange::From100To300 => price >= hundred && price <= three_hundred,
            PriceRange::From300To500 => price >= three_hundred && price <= five_hundred,
            PriceRange::Over500 => price > five_hundred,
        }
    }
}

impl std::fmt::Display for PriceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PriceRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownPriceRange(s.to_string()))
    }
}

/// Catalog filter criteria. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Display category name or slug; `"all"` means no category filter.
    pub category: Option<String>,
    /// Free text matched against title, raw categories and description.
    pub search: Option<String>,
    pub price_range: Option<PriceRange>,
}

impl ProductFilters {
    /// The requested category, unless it is blank or `"all"`.
    #[must_use]
    pub fn active_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    /// The lowercased search term, unless it is empty.
    #[must_use]
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_category().is_none() && self.search_term().is_none() && self.price_range.is_none()
    }
}
