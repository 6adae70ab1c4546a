//! Cart mutation rules.
//!
//! Pure functions over the stored lines of a locked cart. The service loads
//! the lines, applies one change here, and persists whatever [`LineChange`]
//! comes back, so the rules can be exercised without a database.

use crate::domain::{
    carts::{
        data::{NewCartItem, Quantity},
        errors::CartsServiceError,
        records::{CartItemRecord, CartItemUuid},
    },
    equipment::records::EquipmentRecord,
};

/// The single write a mutation needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineChange {
    Inserted(CartItemRecord),
    QuantityChanged {
        uuid: CartItemUuid,
        quantity: Quantity,
    },
    Removed(CartItemUuid),
    Cleared,
    Unchanged,
}

impl LineChange {
    /// Whether the change bumps the cart version.
    pub(crate) fn is_effective(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Totals are stored in `BIGINT` columns.
const MAX_STORED_TOTAL: u64 = i64::MAX.unsigned_abs();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CartTotals {
    pub(crate) total_items: u64,
    pub(crate) total_price: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CartAggregate {
    lines: Vec<CartItemRecord>,
}

impl CartAggregate {
    pub(crate) fn new(lines: Vec<CartItemRecord>) -> Self {
        Self { lines }
    }

    #[cfg(test)]
    pub(crate) fn lines(&self) -> &[CartItemRecord] {
        &self.lines
    }

    /// Merge into the line for the same equipment, or append a new line
    /// priced at the current catalog price.
    pub(crate) fn add(
        &mut self,
        item: NewCartItem,
        equipment: &EquipmentRecord,
    ) -> Result<LineChange, CartsServiceError> {
        if !equipment.in_stock {
            return Err(CartsServiceError::Unavailable);
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.equipment_uuid == equipment.uuid)
        {
            // The existing price snapshot is kept.
            line.quantity = line.quantity.checked_add(item.quantity)?;

            return Ok(LineChange::QuantityChanged {
                uuid: line.uuid,
                quantity: line.quantity,
            });
        }

        let line = CartItemRecord {
            uuid: item.uuid,
            equipment_uuid: equipment.uuid,
            price: equipment.price,
            quantity: item.quantity,
        };

        self.lines.push(line.clone());

        Ok(LineChange::Inserted(line))
    }

    pub(crate) fn set_quantity(
        &mut self,
        uuid: CartItemUuid,
        quantity: Quantity,
    ) -> Result<LineChange, CartsServiceError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.uuid == uuid)
            .ok_or(CartsServiceError::NotFound)?;

        if line.quantity == quantity {
            return Ok(LineChange::Unchanged);
        }

        line.quantity = quantity;

        Ok(LineChange::QuantityChanged { uuid, quantity })
    }

    /// Removing an absent line is not an error.
    pub(crate) fn remove(&mut self, uuid: CartItemUuid) -> LineChange {
        let before = self.lines.len();

        self.lines.retain(|line| line.uuid != uuid);

        if self.lines.len() == before {
            LineChange::Unchanged
        } else {
            LineChange::Removed(uuid)
        }
    }

    pub(crate) fn clear(&mut self) -> LineChange {
        if self.lines.is_empty() {
            return LineChange::Unchanged;
        }

        self.lines.clear();

        LineChange::Cleared
    }

    pub(crate) fn totals(&self) -> Result<CartTotals, CartsServiceError> {
        self.lines
            .iter()
            .try_fold(CartTotals::default(), |totals, line| {
                let quantity = u64::from(line.quantity.get());

                Some(CartTotals {
                    total_items: totals.total_items.checked_add(quantity)?,
                    total_price: totals
                        .total_price
                        .checked_add(line.price.checked_mul(quantity)?)?,
                })
            })
            .filter(|totals| {
                totals.total_items <= MAX_STORED_TOTAL && totals.total_price <= MAX_STORED_TOTAL
            })
            .ok_or(CartsServiceError::InvalidData)
    }
}
