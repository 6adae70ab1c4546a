//! Presentation-only price summary.
//!
//! Tax and shipping are derived for display and never sent to the server; the
//! server's `totalPrice` stays the authoritative pre-tax total.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

use crate::models::Cart;

/// Flat sales tax applied for display.
const TAX_RATE: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// An amount does not fit the money representation.
    #[error("amount out of range")]
    Overflow,
}

/// Subtotal, tax, shipping and total in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: u64,
    pub tax: u64,
    pub shipping: u64,
    pub total: u64,
}

/// [`CartSummary`] rendered as USD strings, e.g. `$302.40`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSummary {
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
}

impl CartSummary {
    /// Derive the display summary for a cart.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Overflow`] if an amount does not fit in `i64` cents.
    pub fn from_cart(cart: &Cart) -> Result<Self, SummaryError> {
        let subtotal = cart.total_price;

        if i64::try_from(subtotal).is_err() {
            return Err(SummaryError::Overflow);
        }

        let tax = tax_on(subtotal)?;
        let shipping = 0;
        let total = subtotal
            .checked_add(tax)
            .and_then(|total| total.checked_add(shipping))
            .ok_or(SummaryError::Overflow)?;

        Ok(Self {
            subtotal,
            tax,
            shipping,
            total,
        })
    }

    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.shipping == 0
    }

    /// Format each amount as US dollars.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Overflow`] for amounts beyond `i64` cents.
    pub fn formatted(&self) -> Result<FormattedSummary, SummaryError> {
        Ok(FormattedSummary {
            subtotal: usd(self.subtotal)?,
            tax: usd(self.tax)?,
            shipping: usd(self.shipping)?,
            total: usd(self.total)?,
        })
    }
}

/// Tax in cents, rounded half away from zero.
fn tax_on(subtotal: u64) -> Result<u64, SummaryError> {
    let applied = Percentage::from(TAX_RATE) * Decimal::from(subtotal);

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(SummaryError::Overflow)
}

fn usd(cents: u64) -> Result<String, SummaryError> {
    let cents = i64::try_from(cents).map_err(|_overflow| SummaryError::Overflow)?;

    Ok(Money::from_minor(cents, iso::USD).to_string())
}
