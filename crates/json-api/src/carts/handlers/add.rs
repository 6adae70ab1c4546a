//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sportspro_app::domain::{
    carts::{
        CartsServiceError,
        data::{NewCartItem, Quantity},
        records::CartItemUuid,
    },
    equipment::records::EquipmentUuid,
};

use crate::{
    carts::{errors::into_status_error, record_mutation, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartItemRequest {
    /// Equipment to add
    pub equipment_id: Uuid,

    /// Units to add; defaults to one
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl TryFrom<AddCartItemRequest> for NewCartItem {
    type Error = CartsServiceError;

    fn try_from(request: AddCartItemRequest) -> Result<Self, Self::Error> {
        let quantity = match request.quantity {
            Some(quantity) => Quantity::try_from(quantity)?,
            None => Quantity::ONE,
        };

        Ok(NewCartItem {
            uuid: CartItemUuid::new(),
            equipment_uuid: EquipmentUuid::from_uuid(request.equipment_id),
            quantity,
        })
    }
}

/// Add Cart Item Handler
///
/// Adds equipment to the caller's cart, merging with an existing line for the
/// same equipment.
#[endpoint(
    tags("cart"),
    summary = "Add Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Quantity below one"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::NOT_FOUND, description = "Equipment not found"),
        (status_code = StatusCode::CONFLICT, description = "Equipment out of stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.add",
    skip(json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        equipment_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("equipment_uuid", tracing::field::display(request.equipment_id));
    span.record("quantity", request.quantity.unwrap_or(1));

    let item = NewCartItem::try_from(request).map_err(into_status_error)?;

    let cart = record_mutation("add", state.app.carts.add_item(user, item).await)
        .map_err(into_status_error)?;

    tracing::info!(version = cart.version, total_items = cart.total_items, "added cart item");

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use sportspro_app::domain::carts::MockCartsService;

    use crate::test_helpers::{TEST_USER_UUID, carts_service, make_cart, make_cart_item};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/add").post(handler))
    }

    #[tokio::test]
    async fn add_returns_updated_cart() -> TestResult {
        let mut carts = MockCartsService::new();
        let line = make_cart_item(5_000, 2);
        let equipment = line.equipment_uuid;
        let cart = make_cart(vec![line]);

        carts
            .expect_add_item()
            .once()
            .withf(move |user, item| {
                *user == TEST_USER_UUID
                    && item.equipment_uuid == equipment
                    && item.quantity.get() == 2
            })
            .return_once(move |_, _| Ok(cart));

        let mut res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "equipmentId": equipment.into_uuid(), "quantity": 2 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CartResponse = res.take_json().await?;

        assert_eq!(body.total_items, 2);
        assert_eq!(body.total_price, 10_000);

        Ok(())
    }

    #[tokio::test]
    async fn add_without_quantity_defaults_to_one() {
        let mut carts = MockCartsService::new();
        let cart = make_cart(vec![make_cart_item(1_000, 1)]);

        carts
            .expect_add_item()
            .once()
            .withf(|_, item| item.quantity == Quantity::ONE)
            .return_once(move |_, _| Ok(cart));

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "equipmentId": Uuid::now_v7() }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn add_non_positive_quantity_returns_400_without_calling_service() {
        for quantity in [0, -1] {
            let mut carts = MockCartsService::new();

            carts.expect_add_item().never();

            let res = TestClient::post("http://example.com/cart/add")
                .json(&json!({ "equipmentId": Uuid::now_v7(), "quantity": quantity }))
                .send(&make_service(carts))
                .await;

            assert_eq!(
                res.status_code,
                Some(StatusCode::BAD_REQUEST),
                "quantity {quantity}"
            );
        }
    }

    #[tokio::test]
    async fn add_unknown_equipment_returns_404() {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::EquipmentNotFound));

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "equipmentId": Uuid::now_v7() }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn add_out_of_stock_returns_409() {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::Unavailable));

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "equipmentId": Uuid::now_v7(), "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }
}
