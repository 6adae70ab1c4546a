//! Cart Records

use jiff::Timestamp;

use crate::{
    domain::{carts::data::Quantity, equipment::records::EquipmentUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Cart Record
///
/// The stored cart row. Totals here are only ever written from
/// recomputed line values.
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub user_uuid: UserUuid,
    pub total_items: u64,
    pub total_price: u64,

    /// Bumped by every mutation that changes a line.
    pub version: u64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record
///
/// One line of a cart as persisted, without catalog display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub equipment_uuid: EquipmentUuid,

    /// Catalog price captured when the line was created.
    pub price: u64,

    pub quantity: Quantity,
}
