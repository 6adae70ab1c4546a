//! Cart Data

use std::num::NonZeroU32;

use thiserror::Error;

use crate::domain::{carts::records::CartItemUuid, equipment::records::EquipmentUuid};

/// Largest quantity a single line may hold (the column is a signed 32-bit integer).
const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Raised for a quantity outside `1..=i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quantity must be between 1 and {MAX_QUANTITY}")]
pub struct InvalidQuantity;

/// Line item quantity; never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    pub const ONE: Self = Self(NonZeroU32::MIN);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, failing when the sum leaves the storable range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidQuantity`] on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, InvalidQuantity> {
        let sum = self.get().checked_add(other.get()).ok_or(InvalidQuantity)?;

        Self::try_from(sum)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = InvalidQuantity;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > MAX_QUANTITY {
            return Err(InvalidQuantity);
        }

        NonZeroU32::new(value).map(Self).ok_or(InvalidQuantity)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = InvalidQuantity;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_overflow| InvalidQuantity)
            .and_then(Self::try_from)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        // `Quantity` is capped at `i32::MAX` on construction.
        i32::try_from(quantity.get()).unwrap_or(i32::MAX)
    }
}

/// New Cart Item Data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCartItem {
    /// Identifier used if the item becomes a new line.
    pub uuid: CartItemUuid,
    pub equipment_uuid: EquipmentUuid,
    pub quantity: Quantity,
}
