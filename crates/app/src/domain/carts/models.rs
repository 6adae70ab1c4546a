//! Cart Models

use jiff::Timestamp;

use crate::domain::{
    carts::{
        data::Quantity,
        records::{CartItemUuid, CartRecord},
    },
    equipment::records::EquipmentUuid,
    users::records::UserUuid,
};

/// Cart Model
#[derive(Debug, Clone)]
pub struct Cart {
    pub user_uuid: UserUuid,
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub total_price: u64,
    pub version: u64,

    /// `None` until the first item is added.
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Cart {
    /// The cart a user has before their first `add_item`.
    #[must_use]
    pub fn empty(user_uuid: UserUuid) -> Self {
        Self {
            user_uuid,
            items: Vec::new(),
            total_items: 0,
            total_price: 0,
            version: 0,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn from_parts(record: CartRecord, items: Vec<CartItem>) -> Self {
        Self {
            user_uuid: record.user_uuid,
            items,
            total_items: record.total_items,
            total_price: record.total_price,
            version: record.version,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
        }
    }
}

/// Cart Item Model
#[derive(Debug, Clone)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub equipment_uuid: EquipmentUuid,

    /// Price snapshot in minor units.
    pub price: u64,

    pub quantity: Quantity,
    pub equipment: CartItemEquipment,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Catalog display fields, read fresh on every cart read.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemEquipment {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub images: Vec<String>,
    pub in_stock: bool,
}
