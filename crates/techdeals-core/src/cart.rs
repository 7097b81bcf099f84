//! Totals for the browser-held cart. The server never stores a cart; it only
//! prices the lines a client sends.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::parse_price;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub title: String,
    /// Price display string as shown on the product card, e.g. `"$22.99"`.
    pub price: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub count: u64,
    pub total: Decimal,
}

/// Sums item count and price across cart lines.
///
/// Lines with quantity 0 are ignored. A line whose price cannot be parsed
/// still counts toward `count` but adds nothing to `total`.
#[must_use]
pub fn summarize_cart(lines: &[CartLine]) -> CartSummary {
    lines
        .iter()
        .filter(|line| line.quantity > 0)
        .fold(
            CartSummary {
                count: 0,
                total: Decimal::ZERO,
            },
            |mut acc, line| {
                acc.count += u64::from(line.quantity);
                if let Some(price) = parse_price(&line.price) {
                    acc.total += price * Decimal::from(line.quantity);
                }
                acc
            },
        )
}
