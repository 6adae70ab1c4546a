//! Client-side cart cache.
//!
//! [`CartSync`] is pessimistic: the cached cart only changes when the server
//! confirms a mutation, and then it is replaced wholesale. At most one request
//! per line item is outstanding at a time; an add also holds the line it would
//! merge into.

use std::{
    fmt::{self, Debug, Formatter},
    future::Future,
    sync::Arc,
    time::Duration,
};

use rustc_hash::FxHashSet;
use tokio::{
    sync::{RwLock, broadcast, watch},
    time,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    api::CartApi,
    errors::{CartApiError, SyncError},
    models::Cart,
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const NOTIFICATION_CAPACITY: usize = 64;

/// Sync client settings.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Upper bound on one request; on expiry the in-flight marker is cleared.
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// What an outstanding request is mutating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InFlightKey {
    /// An add for this equipment.
    Equipment(Uuid),

    /// An update or removal of this line item.
    Item(Uuid),

    /// A whole-cart clear.
    Cart,
}

/// Cart operation a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Add,
    UpdateQuantity,
    Remove,
    Clear,
}

/// Why a request failed, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    InvalidArgument,
    Unavailable,
    Network,
    TimedOut,
    Server,
}

/// Transient user-facing message published after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    SignInRequired,
    Succeeded(Operation),
    Failed {
        operation: Operation,
        kind: FailureKind,
        retryable: bool,
    },
    CheckoutUnavailable,
}

impl Notification {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::SignInRequired => "Please sign in to use your cart",
            Self::Succeeded(Operation::Refresh) => "Cart refreshed",
            Self::Succeeded(Operation::Add) => "Added to cart",
            Self::Succeeded(Operation::UpdateQuantity) => "Cart updated",
            Self::Succeeded(Operation::Remove) => "Removed from cart",
            Self::Succeeded(Operation::Clear) => "Cart cleared",
            Self::Failed { kind, .. } => match kind {
                FailureKind::NotFound => "That item could not be found",
                FailureKind::InvalidArgument => "Quantity must be at least 1",
                FailureKind::Unavailable => "That item is out of stock",
                FailureKind::Network => "Could not reach the server, please try again",
                FailureKind::TimedOut => "The request timed out, please try again",
                FailureKind::Server => "Something went wrong, please try again",
            },
            Self::CheckoutUnavailable => "Checkout is not available yet",
        }
    }
}

/// Snapshot published to subscribers on every change.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Cart,
    loading: u32,
    signed_in: bool,
    in_flight: FxHashSet<InFlightKey>,
    session: u64,
}

impl CartState {
    /// Last cart confirmed by the server; empty while signed out.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// A full cart fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    /// Controls for this key should be disabled.
    #[must_use]
    pub fn is_in_flight(&self, key: &InFlightKey) -> bool {
        self.in_flight.contains(key)
    }
}

struct Session {
    id: u64,
    api: Arc<dyn CartApi>,
}

/// Outcome of reconciling a server response with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciled {
    Replaced,
    Stale,
    SessionChanged,
}

/// Client-resident mirror of the user's cart.
pub struct CartSync {
    config: SyncConfig,
    session: RwLock<Option<Session>>,
    state: watch::Sender<CartState>,
    notifications: broadcast::Sender<Notification>,
}

impl Debug for CartSync {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSync")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CartSync {
    /// Create a signed-out client holding an empty cart.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        let (state, _initial) = watch::channel(CartState::default());
        let (notifications, _initial) = broadcast::channel(NOTIFICATION_CAPACITY);

        Self {
            config,
            session: RwLock::new(None),
            state,
            notifications,
        }
    }

    /// Watch cart state changes.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Receive one notification per mutation outcome.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Start a session for a signed-in user and load their cart.
    ///
    /// # Errors
    ///
    /// Returns the load failure; the session stays signed in with an empty cart.
    pub async fn sign_in(&self, api: Arc<dyn CartApi>) -> Result<Cart, SyncError> {
        {
            let mut session = self.session.write().await;
            let id = self.state.borrow().session + 1;

            *session = Some(Session { id, api });

            self.state.send_modify(|state| {
                *state = CartState {
                    signed_in: true,
                    session: id,
                    ..CartState::default()
                };
            });
        }

        self.refresh().await
    }

    /// Drop the session; responses still outstanding are discarded.
    pub async fn sign_out(&self) {
        let mut session = self.session.write().await;

        *session = None;

        self.state.send_modify(|state| {
            *state = CartState {
                session: state.session + 1,
                ..CartState::default()
            };
        });
    }

    /// Reload the cart from the server.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SignedOut`] without a session, or the request failure.
    pub async fn refresh(&self) -> Result<Cart, SyncError> {
        let (api, session) = self.current_session().await?;

        self.state.send_if_modified(|state| {
            let current = state.session == session;
            if current {
                state.loading += 1;
            }
            current
        });

        let result = self.call(api.fetch_cart()).await;

        self.state.send_if_modified(|state| {
            let current = state.session == session;
            if current {
                state.loading = state.loading.saturating_sub(1);
            }
            current
        });

        self.finish(Operation::Refresh, session, result)
    }

    /// Add equipment to the cart.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]; the cached cart is unchanged on every error.
    pub async fn add_item(&self, equipment_id: Uuid, quantity: u32) -> Result<Cart, SyncError> {
        self.mutate(
            Operation::Add,
            InFlightKey::Equipment(equipment_id),
            Some(quantity),
            move |api| async move { api.add_item(equipment_id, quantity).await },
        )
        .await
    }

    /// Replace the quantity of a line item.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]; the cached cart is unchanged on every error.
    pub async fn update_quantity(&self, item_id: Uuid, quantity: u32) -> Result<Cart, SyncError> {
        self.mutate(
            Operation::UpdateQuantity,
            InFlightKey::Item(item_id),
            Some(quantity),
            move |api| async move { api.update_quantity(item_id, quantity).await },
        )
        .await
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]; the cached cart is unchanged on every error.
    pub async fn remove_item(&self, item_id: Uuid) -> Result<Cart, SyncError> {
        self.mutate(
            Operation::Remove,
            InFlightKey::Item(item_id),
            None,
            move |api| async move { api.remove_item(item_id).await },
        )
        .await
    }

    /// Remove every line item.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]; the cached cart is unchanged on every error.
    pub async fn clear(&self) -> Result<Cart, SyncError> {
        self.mutate(Operation::Clear, InFlightKey::Cart, None, |api| async move {
            api.clear().await
        })
        .await
    }

    /// Checkout is not implemented; this only publishes a placeholder notice.
    pub fn checkout(&self) {
        if self.state.borrow().signed_in {
            self.notify(Notification::CheckoutUnavailable);
        } else {
            self.notify(Notification::SignInRequired);
        }
    }

    async fn mutate<F, Fut>(
        &self,
        operation: Operation,
        key: InFlightKey,
        quantity: Option<u32>,
        request: F,
    ) -> Result<Cart, SyncError>
    where
        F: FnOnce(Arc<dyn CartApi>) -> Fut,
        Fut: Future<Output = Result<Cart, CartApiError>>,
    {
        let (api, session) = self.current_session().await?;

        if quantity == Some(0) {
            self.notify(Notification::Failed {
                operation,
                kind: FailureKind::InvalidArgument,
                retryable: false,
            });

            return Err(SyncError::InvalidQuantity);
        }

        let _in_flight = match self.mark_in_flight(session, key) {
            Ok(guard) => guard,
            Err(error) => {
                debug!(?key, "cart request suppressed: {error}");

                return Err(error);
            }
        };

        let result = self.call(request(api)).await;

        self.finish(operation, session, result)
    }

    async fn current_session(&self) -> Result<(Arc<dyn CartApi>, u64), SyncError> {
        let session = self.session.read().await;

        match session.as_ref() {
            Some(session) => Ok((Arc::clone(&session.api), session.id)),
            None => {
                self.notify(Notification::SignInRequired);

                Err(SyncError::SignedOut)
            }
        }
    }

    /// Mark every key the request touches, or none of them.
    fn mark_in_flight(&self, session: u64, key: InFlightKey) -> Result<InFlightGuard<'_>, SyncError> {
        let mut marked = Err(SyncError::SessionChanged);

        self.state.send_if_modified(|state| {
            if state.session != session {
                return false;
            }

            let keys = guarded_keys(&state.cart, key);

            if keys.iter().any(|key| state.in_flight.contains(key)) {
                marked = Err(SyncError::InFlight);
                return false;
            }

            state.in_flight.extend(keys.iter().copied());
            marked = Ok(keys);
            true
        });

        marked.map(|keys| InFlightGuard {
            state: &self.state,
            session,
            keys,
        })
    }

    async fn call<Fut>(&self, request: Fut) -> Result<Cart, SyncError>
    where
        Fut: Future<Output = Result<Cart, CartApiError>>,
    {
        match time::timeout(self.config.request_timeout, request).await {
            Ok(result) => result.map_err(SyncError::from),
            Err(_elapsed) => Err(SyncError::TimedOut),
        }
    }

    fn finish(
        &self,
        operation: Operation,
        session: u64,
        result: Result<Cart, SyncError>,
    ) -> Result<Cart, SyncError> {
        match result {
            Ok(cart) => match self.reconcile(session, cart.clone()) {
                Reconciled::SessionChanged => Err(SyncError::SessionChanged),
                reconciled => {
                    if reconciled == Reconciled::Stale {
                        debug!(version = cart.version, "discarded stale cart response");
                    }

                    if operation != Operation::Refresh {
                        self.notify(Notification::Succeeded(operation));
                    }

                    Ok(cart)
                }
            },
            Err(error) => {
                warn!(?operation, "cart request failed: {error}");

                if self.state.borrow().session == session {
                    self.notify(failure_notification(operation, &error));
                }

                Err(error)
            }
        }
    }

    /// Replace the cached cart unless the response is older or from an old session.
    fn reconcile(&self, session: u64, cart: Cart) -> Reconciled {
        let mut reconciled = Reconciled::SessionChanged;

        self.state.send_if_modified(|state| {
            if state.session != session {
                return false;
            }

            if cart.version < state.cart.version {
                reconciled = Reconciled::Stale;
                return false;
            }

            reconciled = Reconciled::Replaced;
            state.cart = cart;
            true
        });

        reconciled
    }

    fn notify(&self, notification: Notification) {
        if let Err(unsent) = self.notifications.send(notification) {
            debug!(notification = ?unsent.0, "no notification subscribers");
        }
    }
}

/// An add merges into the cached line for the same equipment, so it holds that line too.
fn guarded_keys(cart: &Cart, key: InFlightKey) -> Vec<InFlightKey> {
    match key {
        InFlightKey::Equipment(equipment_id) => match cart.item_for_equipment(equipment_id) {
            Some(item) => vec![key, InFlightKey::Item(item.id)],
            None => vec![key],
        },
        InFlightKey::Item(_) | InFlightKey::Cart => vec![key],
    }
}

fn failure_notification(operation: Operation, error: &SyncError) -> Notification {
    let kind = match error {
        SyncError::Api(CartApiError::Unauthenticated) | SyncError::SignedOut => {
            return Notification::SignInRequired;
        }
        SyncError::Api(CartApiError::NotFound(_)) => FailureKind::NotFound,
        SyncError::Api(CartApiError::InvalidArgument(_)) | SyncError::InvalidQuantity => {
            FailureKind::InvalidArgument
        }
        SyncError::Api(CartApiError::Unavailable(_)) => FailureKind::Unavailable,
        SyncError::Api(CartApiError::Transport(_)) => FailureKind::Network,
        SyncError::TimedOut => FailureKind::TimedOut,
        SyncError::Api(CartApiError::Status { .. })
        | SyncError::InFlight
        | SyncError::SessionChanged => FailureKind::Server,
    };

    let retryable = match error {
        SyncError::TimedOut => true,
        SyncError::Api(api_error) => api_error.is_retryable(),
        _ => false,
    };

    Notification::Failed {
        operation,
        kind,
        retryable,
    }
}

/// Clears in-flight markers when the request finishes, fails, or times out.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<CartState>,
    session: u64,
    keys: Vec<InFlightKey>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let (session, keys) = (self.session, &self.keys);

        self.state.send_if_modified(|state| {
            if state.session != session {
                return false;
            }

            keys.iter()
                .fold(false, |cleared, key| state.in_flight.remove(key) || cleared)
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use testresult::TestResult;
    use tokio::sync::{Notify, broadcast::error::TryRecvError};

    use crate::{
        api::MockCartApi,
        models::{CartItem, EquipmentSummary},
    };

    use super::*;

    fn line(price: u64, quantity: u32) -> CartItem {
        CartItem {
            id: Uuid::now_v7(),
            equipment_id: Uuid::now_v7(),
            price,
            quantity,
            equipment: EquipmentSummary {
                name: "Yoga Mat".to_owned(),
                brand: "Flexa".to_owned(),
                category: "yoga".to_owned(),
                images: Vec::new(),
                in_stock: true,
            },
        }
    }

    fn cart(version: u64, items: Vec<CartItem>) -> Cart {
        Cart {
            total_items: items.iter().map(|item| u64::from(item.quantity)).sum(),
            total_price: items
                .iter()
                .map(|item| item.price * u64::from(item.quantity))
                .sum(),
            items,
            version,
            ..Cart::default()
        }
    }

    /// Mock that serves an empty cart on sign-in.
    fn signed_in_mock() -> MockCartApi {
        let mut api = MockCartApi::new();

        api.expect_fetch_cart()
            .once()
            .return_once(|| Ok(Cart::default()));

        api
    }

    async fn signed_in(api: impl CartApi + 'static) -> Result<CartSync, SyncError> {
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::new(api)).await?;

        Ok(sync)
    }

    /// Serves `response` to every mutation, but only after `gate` is notified.
    struct GatedApi {
        gate: Notify,
        calls: AtomicUsize,
        stored: Cart,
        response: Cart,
    }

    impl GatedApi {
        fn new(response: Cart) -> Arc<Self> {
            Self::serving(Cart::default(), response)
        }

        /// Sign-in loads `stored`; mutations answer with `response`.
        fn serving(stored: Cart, response: Cart) -> Arc<Self> {
            Arc::new(Self {
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
                stored,
                response,
            })
        }

        async fn respond(&self) -> Result<Cart, CartApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;

            Ok(self.response.clone())
        }
    }

    /// Answers the sign-in fetch at once; later fetches wait for `gate`.
    #[derive(Default)]
    struct GatedFetches {
        gate: Notify,
        fetches: AtomicUsize,
        completed: AtomicUsize,
    }

    #[async_trait]
    impl CartApi for GatedFetches {
        async fn fetch_cart(&self) -> Result<Cart, CartApiError> {
            if self.fetches.fetch_add(1, Ordering::SeqCst) > 0 {
                self.gate.notified().await;
                self.completed.fetch_add(1, Ordering::SeqCst);
            }

            Ok(Cart::default())
        }

        async fn add_item(&self, _equipment_id: Uuid, _quantity: u32) -> Result<Cart, CartApiError> {
            Ok(Cart::default())
        }

        async fn update_quantity(&self, _item_id: Uuid, _quantity: u32) -> Result<Cart, CartApiError> {
            Ok(Cart::default())
        }

        async fn remove_item(&self, _item_id: Uuid) -> Result<Cart, CartApiError> {
            Ok(Cart::default())
        }

        async fn clear(&self) -> Result<Cart, CartApiError> {
            Ok(Cart::default())
        }
    }

    #[async_trait]
    impl CartApi for GatedApi {
        async fn fetch_cart(&self) -> Result<Cart, CartApiError> {
            Ok(self.stored.clone())
        }

        async fn add_item(&self, _equipment_id: Uuid, _quantity: u32) -> Result<Cart, CartApiError> {
            self.respond().await
        }

        async fn update_quantity(&self, _item_id: Uuid, _quantity: u32) -> Result<Cart, CartApiError> {
            self.respond().await
        }

        async fn remove_item(&self, _item_id: Uuid) -> Result<Cart, CartApiError> {
            self.respond().await
        }

        async fn clear(&self) -> Result<Cart, CartApiError> {
            self.respond().await
        }
    }

    #[tokio::test]
    async fn signed_out_mutations_prompt_sign_in_without_requests() {
        let sync = CartSync::new(SyncConfig::default());
        let mut notifications = sync.notifications();

        let result = sync.add_item(Uuid::now_v7(), 1).await;

        assert!(matches!(result, Err(SyncError::SignedOut)), "got {result:?}");
        assert_eq!(notifications.try_recv().ok(), Some(Notification::SignInRequired));
        assert!(sync.state().cart().is_empty(), "signed-out cart is empty");
        assert!(!sync.state().is_signed_in(), "no session");
    }

    #[tokio::test]
    async fn sign_in_loads_cart_without_notifying() -> TestResult {
        let stored = cart(2, vec![line(5_000, 2)]);
        let expected = stored.clone();
        let mut api = MockCartApi::new();

        api.expect_fetch_cart().once().return_once(move || Ok(stored));

        let sync = CartSync::new(SyncConfig::default());
        let mut notifications = sync.notifications();

        sync.sign_in(Arc::new(api)).await?;

        assert_eq!(sync.state().cart(), &expected);
        assert!(!sync.state().is_loading(), "loading cleared after fetch");
        assert_eq!(notifications.try_recv().err(), Some(TryRecvError::Empty));

        Ok(())
    }

    #[tokio::test]
    async fn successful_add_replaces_cart_and_notifies_once() -> TestResult {
        let equipment = Uuid::now_v7();
        let confirmed = cart(1, vec![line(5_000, 2)]);
        let expected = confirmed.clone();
        let mut api = signed_in_mock();

        api.expect_add_item()
            .once()
            .withf(move |id, quantity| *id == equipment && *quantity == 2)
            .return_once(move |_, _| Ok(confirmed));

        let sync = signed_in(api).await?;
        let mut notifications = sync.notifications();

        sync.add_item(equipment, 2).await?;

        assert_eq!(sync.state().cart(), &expected);
        assert_eq!(
            notifications.try_recv().ok(),
            Some(Notification::Succeeded(Operation::Add))
        );
        assert_eq!(notifications.try_recv().err(), Some(TryRecvError::Empty));

        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_keeps_last_confirmed_cart() -> TestResult {
        let confirmed = cart(1, vec![line(5_000, 2)]);
        let expected = confirmed.clone();
        let mut api = signed_in_mock();

        api.expect_add_item()
            .once()
            .return_once(move |_, _| Ok(confirmed));
        api.expect_update_quantity()
            .once()
            .return_once(|_, _| Err(CartApiError::NotFound("Cart item not found".to_owned())));

        let sync = signed_in(api).await?;

        sync.add_item(Uuid::now_v7(), 2).await?;

        let mut notifications = sync.notifications();
        let result = sync.update_quantity(Uuid::now_v7(), 3).await;

        assert!(
            matches!(result, Err(SyncError::Api(CartApiError::NotFound(_)))),
            "got {result:?}"
        );
        assert_eq!(sync.state().cart(), &expected);
        assert_eq!(
            notifications.try_recv().ok(),
            Some(Notification::Failed {
                operation: Operation::UpdateQuantity,
                kind: FailureKind::NotFound,
                retryable: false,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected_without_a_request() -> TestResult {
        let mut api = signed_in_mock();

        api.expect_update_quantity().never();
        api.expect_add_item().never();

        let sync = signed_in(api).await?;
        let mut notifications = sync.notifications();

        let update = sync.update_quantity(Uuid::now_v7(), 0).await;
        let add = sync.add_item(Uuid::now_v7(), 0).await;

        assert!(matches!(update, Err(SyncError::InvalidQuantity)), "got {update:?}");
        assert!(matches!(add, Err(SyncError::InvalidQuantity)), "got {add:?}");
        assert_eq!(
            notifications.try_recv().ok().as_ref().map(Notification::message),
            Some("Quantity must be at least 1")
        );

        Ok(())
    }

    #[tokio::test]
    async fn out_of_stock_add_surfaces_unavailable() -> TestResult {
        let mut api = signed_in_mock();

        api.expect_add_item()
            .once()
            .return_once(|_, _| Err(CartApiError::Unavailable("Equipment is out of stock".to_owned())));

        let sync = signed_in(api).await?;
        let mut notifications = sync.notifications();

        assert!(sync.add_item(Uuid::now_v7(), 1).await.is_err(), "add should fail");
        assert_eq!(
            notifications.try_recv().ok(),
            Some(Notification::Failed {
                operation: Operation::Add,
                kind: FailureKind::Unavailable,
                retryable: false,
            })
        );
        assert!(sync.state().cart().is_empty(), "cart untouched");

        Ok(())
    }

    #[tokio::test]
    async fn unauthenticated_response_prompts_sign_in() -> TestResult {
        let mut api = signed_in_mock();

        api.expect_clear()
            .once()
            .return_once(|| Err(CartApiError::Unauthenticated));

        let sync = signed_in(api).await?;
        let mut notifications = sync.notifications();

        assert!(sync.clear().await.is_err(), "clear should fail");
        assert_eq!(notifications.try_recv().ok(), Some(Notification::SignInRequired));

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_request_for_same_item_is_suppressed() -> TestResult {
        let api = GatedApi::new(cart(1, Vec::new()));
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::clone(&api) as Arc<dyn CartApi>).await?;

        let item = Uuid::now_v7();

        let (first, duplicate) = tokio::join!(sync.remove_item(item), async {
            assert!(
                sync.state().is_in_flight(&InFlightKey::Item(item)),
                "first request should be marked"
            );

            let duplicate = sync.remove_item(item).await;

            api.gate.notify_one();

            duplicate
        });

        assert!(first.is_ok(), "first request completes: {first:?}");
        assert!(matches!(duplicate, Err(SyncError::InFlight)), "got {duplicate:?}");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        assert!(
            !sync.state().is_in_flight(&InFlightKey::Item(item)),
            "marker cleared after completion"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_of_cached_equipment_holds_its_line() -> TestResult {
        let existing = line(5_000, 1);
        let (equipment, item) = (existing.equipment_id, existing.id);
        let stored = cart(1, vec![existing]);
        let api = GatedApi::serving(stored.clone(), stored);
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::clone(&api) as Arc<dyn CartApi>).await?;

        let (add, update) = tokio::join!(sync.add_item(equipment, 1), async {
            let state = sync.state();

            assert!(state.is_in_flight(&InFlightKey::Equipment(equipment)), "add marked");
            assert!(state.is_in_flight(&InFlightKey::Item(item)), "merged line marked");

            let update = sync.update_quantity(item, 4).await;

            api.gate.notify_one();

            update
        });

        assert!(add.is_ok(), "add completes: {add:?}");
        assert!(matches!(update, Err(SyncError::InFlight)), "got {update:?}");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        let state = sync.state();

        assert!(!state.is_in_flight(&InFlightKey::Equipment(equipment)), "add marker cleared");
        assert!(!state.is_in_flight(&InFlightKey::Item(item)), "line marker cleared");

        Ok(())
    }

    #[tokio::test]
    async fn add_waits_for_pending_change_to_its_line() -> TestResult {
        let existing = line(5_000, 1);
        let (equipment, item) = (existing.equipment_id, existing.id);
        let stored = cart(1, vec![existing]);
        let api = GatedApi::serving(stored.clone(), stored);
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::clone(&api) as Arc<dyn CartApi>).await?;

        let (remove, add) = tokio::join!(sync.remove_item(item), async {
            let add = sync.add_item(equipment, 1).await;

            api.gate.notify_one();

            add
        });

        assert!(remove.is_ok(), "remove completes: {remove:?}");
        assert!(matches!(add, Err(SyncError::InFlight)), "got {add:?}");
        assert!(
            !sync.state().is_in_flight(&InFlightKey::Equipment(equipment)),
            "suppressed add leaves no marker"
        );
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn loading_stays_set_until_every_refresh_finishes() -> TestResult {
        let api = Arc::new(GatedFetches::default());
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::clone(&api) as Arc<dyn CartApi>).await?;

        let (first, second, ()) = tokio::join!(sync.refresh(), sync.refresh(), async {
            assert!(sync.state().is_loading(), "both refreshes outstanding");

            api.gate.notify_one();

            while api.completed.load(Ordering::SeqCst) < 1 {
                tokio::task::yield_now().await;
            }

            assert!(sync.state().is_loading(), "one refresh still outstanding");

            api.gate.notify_one();
        });

        assert!(first.is_ok() && second.is_ok(), "both complete: {first:?} {second:?}");
        assert!(!sync.state().is_loading(), "loading cleared once all finish");

        Ok(())
    }

    #[tokio::test]
    async fn different_items_proceed_concurrently() -> TestResult {
        let api = GatedApi::new(cart(1, Vec::new()));
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::clone(&api) as Arc<dyn CartApi>).await?;

        let (first, second) = (Uuid::now_v7(), Uuid::now_v7());

        let (a, b, ()) = tokio::join!(sync.remove_item(first), sync.update_quantity(second, 4), async {
            let state = sync.state();

            assert!(state.is_in_flight(&InFlightKey::Item(first)), "first marked");
            assert!(state.is_in_flight(&InFlightKey::Item(second)), "second marked");

            api.gate.notify_waiters();
        });

        assert!(a.is_ok() && b.is_ok(), "both complete: {a:?} {b:?}");
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_request_clears_marker_and_is_retryable() -> TestResult {
        let api = GatedApi::new(cart(1, Vec::new()));
        let sync = CartSync::new(SyncConfig {
            request_timeout: Duration::from_secs(2),
        });

        sync.sign_in(api).await?;

        let mut notifications = sync.notifications();
        let item = Uuid::now_v7();
        let result = sync.remove_item(item).await;

        assert!(matches!(result, Err(SyncError::TimedOut)), "got {result:?}");
        assert!(
            !sync.state().is_in_flight(&InFlightKey::Item(item)),
            "marker cleared on timeout"
        );
        assert_eq!(
            notifications.try_recv().ok(),
            Some(Notification::Failed {
                operation: Operation::Remove,
                kind: FailureKind::TimedOut,
                retryable: true,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn stale_response_does_not_replace_newer_cart() -> TestResult {
        let newer = cart(5, vec![line(3_000, 1)]);
        let expected = newer.clone();
        let mut api = signed_in_mock();

        api.expect_add_item().once().return_once(move |_, _| Ok(newer));
        api.expect_remove_item()
            .once()
            .return_once(|_| Ok(cart(3, Vec::new())));

        let sync = signed_in(api).await?;

        sync.add_item(Uuid::now_v7(), 1).await?;

        let mut notifications = sync.notifications();
        let response = sync.remove_item(Uuid::now_v7()).await?;

        assert_eq!(response.version, 3);
        assert_eq!(sync.state().cart(), &expected);
        assert_eq!(
            notifications.try_recv().ok(),
            Some(Notification::Succeeded(Operation::Remove))
        );

        Ok(())
    }

    #[tokio::test]
    async fn sign_out_discards_late_responses() -> TestResult {
        let api = GatedApi::new(cart(1, vec![line(5_000, 1)]));
        let sync = CartSync::new(SyncConfig::default());

        sync.sign_in(Arc::clone(&api) as Arc<dyn CartApi>).await?;

        let mut notifications = sync.notifications();

        let (result, ()) = tokio::join!(sync.add_item(Uuid::now_v7(), 1), async {
            sync.sign_out().await;
            api.gate.notify_one();
        });

        assert!(matches!(result, Err(SyncError::SessionChanged)), "got {result:?}");
        assert!(sync.state().cart().is_empty(), "signed-out cart is empty");
        assert!(!sync.state().is_signed_in(), "session dropped");
        assert_eq!(notifications.try_recv().err(), Some(TryRecvError::Empty));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_is_a_placeholder() -> TestResult {
        let sync = CartSync::new(SyncConfig::default());
        let mut notifications = sync.notifications();

        sync.checkout();

        assert_eq!(notifications.try_recv().ok(), Some(Notification::SignInRequired));

        sync.sign_in(Arc::new(signed_in_mock())).await?;
        sync.checkout();

        assert_eq!(
            notifications.try_recv().ok(),
            Some(Notification::CheckoutUnavailable)
        );

        Ok(())
    }

    #[tokio::test]
    async fn state_subscribers_see_confirmed_carts() -> TestResult {
        let confirmed = cart(1, vec![line(2_000, 3)]);
        let mut api = signed_in_mock();

        api.expect_add_item()
            .once()
            .return_once(move |_, _| Ok(confirmed));

        let sync = signed_in(api).await?;
        let mut states = sync.subscribe();

        states.mark_unchanged();
        sync.add_item(Uuid::now_v7(), 3).await?;

        assert!(states.has_changed()?, "subscriber should be woken");
        assert_eq!(states.borrow_and_update().cart().total_price, 6_000);

        Ok(())
    }
}
