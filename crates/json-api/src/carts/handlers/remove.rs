//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use sportspro_app::domain::carts::records::CartItemUuid;

use crate::{
    carts::{errors::into_status_error, record_mutation, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
///
/// Removing an item that is not in the cart returns the cart unchanged.
#[endpoint(
    tags("cart"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.remove",
    skip(item, depot),
    fields(user_uuid = tracing::field::Empty, item_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let item = CartItemUuid::from_uuid(item.into_inner());

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("item_uuid", tracing::field::display(item));

    let cart = record_mutation("remove", state.app.carts.remove_item(user, item).await)
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use sportspro_app::domain::carts::MockCartsService;

    use crate::test_helpers::{TEST_USER_UUID, carts_service, make_cart, make_cart_item};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/remove/{item}").delete(handler))
    }

    #[tokio::test]
    async fn remove_returns_remaining_items() -> TestResult {
        let mut carts = MockCartsService::new();
        let removed = CartItemUuid::new();
        let cart = make_cart(vec![make_cart_item(3_000, 1)]);

        carts
            .expect_remove_item()
            .once()
            .withf(move |user, item| *user == TEST_USER_UUID && *item == removed)
            .return_once(move |_, _| Ok(cart));

        let mut res = TestClient::delete(format!("http://example.com/cart/remove/{removed}"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CartResponse = res.take_json().await?;

        assert_eq!(body.total_items, 1);
        assert_eq!(body.total_price, 3_000);

        Ok(())
    }

    #[tokio::test]
    async fn remove_with_invalid_item_id_is_rejected() {
        let mut carts = MockCartsService::new();

        carts.expect_remove_item().never();

        let res = TestClient::delete("http://example.com/cart/remove/not-a-uuid")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
