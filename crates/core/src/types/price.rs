//! Price representation as delivered by the retail backend.
//!
//! The backend stores prices as whole cents, but the payload is loosely typed:
//! older records carry fractional numbers or even strings. [`Price`] keeps the
//! raw value so nothing is lost, and exposes the numeric view used for totals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price as received from the backend.
///
/// Integer values are amounts in cents. Anything else is kept verbatim; numeric
/// values still count toward totals, non-numeric ones count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    /// Whole amount in cents.
    Cents(i64),
    /// Any other JSON value (fractional number, string, ...).
    Other(serde_json::Value),
}

impl Price {
    /// Create a price from an amount in cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self::Cents(cents)
    }

    /// Numeric amount in cents, or `None` when the value is not a number.
    #[must_use]
    pub fn amount_cents(&self) -> Option<Decimal> {
        match self {
            Self::Cents(cents) => Some(Decimal::from(*cents)),
            Self::Other(serde_json::Value::Number(n)) => {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
            Self::Other(_) => None,
        }
    }

    /// Format for display.
    ///
    /// Numbers render as dollars (`$12.99`); anything else renders as its
    /// string form.
    #[must_use]
    pub fn display(&self) -> String {
        if let Some(cents) = self.amount_cents() {
            return format_cents(cents);
        }
        match self {
            Self::Other(serde_json::Value::String(s)) => s.clone(),
            Self::Other(value) => value.to_string(),
            Self::Cents(cents) => format_cents(Decimal::from(*cents)),
        }
    }
}

impl From<i64> for Price {
    fn from(cents: i64) -> Self {
        Self::Cents(cents)
    }
}

/// Format an amount in cents as dollars with two decimal places.
#[must_use]
pub fn format_cents(cents: Decimal) -> String {
    let dollars = (cents / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${dollars:.2}")
}
