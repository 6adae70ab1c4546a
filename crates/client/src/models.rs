//! Cart wire models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's cart as returned by the cart server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owning user; nil for the signed-out placeholder cart.
    #[serde(default)]
    pub user_id: Uuid,

    /// Line items in display order.
    pub items: Vec<CartItem>,

    /// Sum of all line quantities.
    pub total_items: u64,

    /// Pre-tax total in cents.
    pub total_price: u64,

    /// Bumped by every effective server-side mutation.
    #[serde(default)]
    pub version: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line item by id.
    #[must_use]
    pub fn item(&self, id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up the line holding a piece of equipment.
    #[must_use]
    pub fn item_for_equipment(&self, equipment_id: Uuid) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.equipment_id == equipment_id)
    }
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub equipment_id: Uuid,

    /// Price snapshot in cents, taken when the line was created.
    pub price: u64,

    pub quantity: u32,
    pub equipment: EquipmentSummary,
}

/// Catalog display fields for a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub in_stock: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddItemRequest {
    pub(crate) equipment_id: Uuid,
    pub(crate) quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateQuantityRequest {
    pub(crate) quantity: u32,
}
