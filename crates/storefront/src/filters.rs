//! Display formatting shared by the views.

use rust_decimal::Decimal;
use shopfront_core::{CartLineItem, Price, format_cents};

/// Placeholder for a missing price on the cart page.
pub const MISSING_PRICE: &str = "N/A";

/// Formatted price, or `None` when there is none to show.
///
/// Cents render as dollars (`1299` → `$12.99`); any other value renders as-is.
#[must_use]
pub fn price(price: Option<&Price>) -> Option<String> {
    price.map(Price::display)
}

/// Formatted price, with [`MISSING_PRICE`] standing in for a missing one.
#[must_use]
pub fn price_or_na(price: Option<&Price>) -> String {
    self::price(price).unwrap_or_else(|| MISSING_PRICE.to_string())
}

/// Formatted amount in cents.
#[must_use]
pub fn cents(amount: Decimal) -> String {
    format_cents(amount)
}

/// Formatted price times quantity of a cart line.
///
/// Lines without a numeric price have no meaningful total and show
/// [`MISSING_PRICE`].
#[must_use]
pub fn line_total(item: &CartLineItem) -> String {
    match item.price.as_ref().and_then(Price::amount_cents) {
        Some(_) => format_cents(item.line_total()),
        None => MISSING_PRICE.to_string(),
    }
}
