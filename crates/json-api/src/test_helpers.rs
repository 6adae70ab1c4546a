//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use sportspro_app::{
    auth::MockAuthService,
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            data::Quantity,
            models::{Cart, CartItem, CartItemEquipment},
            records::CartItemUuid,
        },
        equipment::records::EquipmentUuid,
        users::records::UserUuid,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_uuid(TEST_USER_UUID);
    ctrl.call_next(req, depot, res).await;
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_update_item_quantity().never();
    carts.expect_remove_item().never();
    carts.expect_clear().never();

    carts
}

fn state_with(carts: MockCartsService, auth: MockAuthService) -> Arc<State> {
    State::from_app_context(AppContext {
        carts: Arc::new(carts),
        auth: Arc::new(auth),
    })
}

pub(crate) fn state_with_carts(carts: MockCartsService) -> Arc<State> {
    state_with(carts, strict_auth_mock())
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state_with(strict_carts_mock(), auth)
}

/// Mount `route` behind an already-authenticated test user.
pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_carts(carts)))
            .hoop(inject_user)
            .push(route),
    )
}

pub(crate) fn make_cart_item(price: u64, quantity: u32) -> CartItem {
    CartItem {
        uuid: CartItemUuid::new(),
        equipment_uuid: EquipmentUuid::new(),
        price,
        quantity: Quantity::try_from(quantity).unwrap_or_default(),
        equipment: CartItemEquipment {
            name: "Adjustable Dumbbell".to_owned(),
            brand: "IronWorks".to_owned(),
            category: "strength".to_owned(),
            images: vec!["https://cdn.sportspro.test/dumbbell.jpg".to_owned()],
            in_stock: true,
        },
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A stored cart for the test user with totals derived from `items`.
pub(crate) fn make_cart(items: Vec<CartItem>) -> Cart {
    Cart {
        user_uuid: TEST_USER_UUID,
        total_items: items.iter().map(|item| u64::from(item.quantity.get())).sum(),
        total_price: items
            .iter()
            .map(|item| item.price * u64::from(item.quantity.get()))
            .sum(),
        items,
        version: 1,
        created_at: Some(Timestamp::UNIX_EPOCH),
        updated_at: Some(Timestamp::UNIX_EPOCH),
    }
}
