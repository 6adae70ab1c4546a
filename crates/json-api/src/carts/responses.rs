//! Cart wire representations.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sportspro_app::domain::carts::models::{Cart, CartItem, CartItemEquipment};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    /// The user owning the cart
    pub user_id: Uuid,

    /// Line items in insertion order
    pub items: Vec<CartItemResponse>,

    /// Sum of all line quantities
    pub total_items: u64,

    /// Sum of price snapshot times quantity, in cents
    pub total_price: u64,

    /// Incremented by every effective mutation
    pub version: u64,

    /// Absent until the first item is added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            user_id: cart.user_uuid.into_uuid(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            total_items: cart.total_items,
            total_price: cart.total_price,
            version: cart.version,
            created_at: cart.created_at.map(|at| at.to_string()),
            updated_at: cart.updated_at.map(|at| at.to_string()),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    /// Line item identifier, stable across quantity changes
    pub id: Uuid,

    pub equipment_id: Uuid,

    /// Catalog price when the line was created, in cents
    pub price: u64,

    pub quantity: u32,

    pub equipment: EquipmentSummary,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.uuid.into_uuid(),
            equipment_id: item.equipment_uuid.into_uuid(),
            price: item.price,
            quantity: item.quantity.get(),
            equipment: item.equipment.into(),
        }
    }
}

/// Catalog display fields for a line item
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EquipmentSummary {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub images: Vec<String>,
    pub in_stock: bool,
}

impl From<CartItemEquipment> for EquipmentSummary {
    fn from(equipment: CartItemEquipment) -> Self {
        Self {
            name: equipment.name,
            brand: equipment.brand,
            category: equipment.category,
            images: equipment.images,
            in_stock: equipment.in_stock,
        }
    }
}
