//! Cart API seam.

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::{errors::CartApiError, models::Cart};

/// Authenticated access to the cart server. Every call returns the full cart.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// `GET /cart`
    async fn fetch_cart(&self) -> Result<Cart, CartApiError>;

    /// `POST /cart/add`
    async fn add_item(&self, equipment_id: Uuid, quantity: u32) -> Result<Cart, CartApiError>;

    /// `PUT /cart/update/{item_id}`
    async fn update_quantity(&self, item_id: Uuid, quantity: u32) -> Result<Cart, CartApiError>;

    /// `DELETE /cart/remove/{item_id}`
    async fn remove_item(&self, item_id: Uuid) -> Result<Cart, CartApiError>;

    /// `DELETE /cart/clear`
    async fn clear(&self) -> Result<Cart, CartApiError>;
}
