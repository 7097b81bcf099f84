//! Currency-string parsing.
//!
//! Scraped prices arrive as display strings (`"$1,299.99"`). They are parsed
//! once when a record is ingested so that filters compare numbers, never
//! strings.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Parses the leading amount out of a currency display string.
///
/// Leading whitespace and currency symbols are skipped, thousands separators
/// are dropped, and parsing stops at the first character that cannot be part
/// of the amount, so `"$19.99 - $29.99"` yields `19.99`.
///
/// Returns `None` when no digits are present.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let start = raw.find(|c: char| c.is_ascii_digit() || c == '.')?;

    let mut digits = String::new();
    for c in raw[start..].chars() {
        match c {
            '0'..='9' | '.' => digits.push(c),
            ',' => {}
            _ => break,
        }
    }

    let digits = digits.trim_end_matches('.');
    if !digits.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    Decimal::from_str(digits).ok()
}

/// Converts a decimal amount into integer minor units (cents), rounding half
/// away from zero.
#[must_use]
pub fn to_cents(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
