//! App Router

use salvo::Router;

use crate::{auth, carts::handlers};

/// Authenticated cart routes.
pub(crate) fn app_router() -> Router {
    Router::new().hoop(auth::middleware::handler).push(
        Router::with_path("cart")
            .get(handlers::get::handler)
            .push(Router::with_path("add").post(handlers::add::handler))
            .push(Router::with_path("update/{item}").put(handlers::update::handler))
            .push(Router::with_path("remove/{item}").delete(handlers::remove::handler))
            .push(Router::with_path("clear").delete(handlers::clear::handler)),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use salvo::{
        Service,
        affix_state::inject,
        http::{StatusCode, header::AUTHORIZATION},
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use sportspro_app::{
        auth::{AuthServiceError, MockAuthService},
        context::AppContext,
        domain::carts::{MockCartsService, models::Cart},
    };

    use crate::{
        carts::responses::CartResponse,
        state::State,
        test_helpers::{TEST_USER_UUID, make_cart, make_cart_item},
    };

    use super::*;

    const TOKEN: &str = "sp_v1_0190d1b45a6e7c3d8f2a1b2c3d4e5f60.secret";

    fn make_service(carts: MockCartsService, auth: MockAuthService) -> Service {
        let state = State::from_app_context(AppContext {
            carts: Arc::new(carts),
            auth: Arc::new(auth),
        });

        Service::new(Router::new().hoop(inject(state)).push(app_router()))
    }

    #[tokio::test]
    async fn unauthenticated_add_is_rejected_before_the_cart_is_touched() {
        let mut carts = MockCartsService::new();
        let mut auth = MockAuthService::new();

        carts.expect_add_item().never();
        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::post("http://example.com/cart/add")
            .add_header(AUTHORIZATION, "Bearer revoked", true)
            .json(&json!({ "equipmentId": Uuid::now_v7() }))
            .send(&make_service(carts, auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn every_cart_route_is_mounted() -> TestResult {
        let item = make_cart_item(5_000, 1);
        let item_uuid = item.uuid;
        let stored = make_cart(vec![item]);

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .times(5)
            .withf(|token| token == TOKEN)
            .returning(|_| Ok(TEST_USER_UUID));

        let mut carts = MockCartsService::new();
        let (get, add, update) = (stored.clone(), stored.clone(), stored);

        carts.expect_get_cart().once().return_once(move |_| Ok(get));
        carts.expect_add_item().once().return_once(move |_, _| Ok(add));
        carts
            .expect_update_item_quantity()
            .once()
            .return_once(move |_, _, _| Ok(update));
        carts
            .expect_remove_item()
            .once()
            .return_once(|user, _| Ok(Cart::empty(user)));
        carts
            .expect_clear()
            .once()
            .return_once(|user| Ok(Cart::empty(user)));

        let service = make_service(carts, auth);
        let bearer = format!("Bearer {TOKEN}");

        let responses = [
            TestClient::get("http://example.com/cart")
                .add_header(AUTHORIZATION, bearer.as_str(), true)
                .send(&service)
                .await,
            TestClient::post("http://example.com/cart/add")
                .add_header(AUTHORIZATION, bearer.as_str(), true)
                .json(&json!({ "equipmentId": Uuid::now_v7() }))
                .send(&service)
                .await,
            TestClient::put(format!("http://example.com/cart/update/{item_uuid}"))
                .add_header(AUTHORIZATION, bearer.as_str(), true)
                .json(&json!({ "quantity": 3 }))
                .send(&service)
                .await,
            TestClient::delete(format!("http://example.com/cart/remove/{item_uuid}"))
                .add_header(AUTHORIZATION, bearer.as_str(), true)
                .send(&service)
                .await,
            TestClient::delete("http://example.com/cart/clear")
                .add_header(AUTHORIZATION, bearer.as_str(), true)
                .send(&service)
                .await,
        ];

        for mut res in responses {
            assert_eq!(res.status_code, Some(StatusCode::OK));

            let body: CartResponse = res.take_json().await?;

            assert_eq!(body.user_id, TEST_USER_UUID.into_uuid());
        }

        Ok(())
    }
}
