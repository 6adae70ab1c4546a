//! SportsPro Cart Sync Client
//!
//! A client-side mirror of the server's cart. [`CartSync`] holds the last
//! confirmed cart, marks line items with a request outstanding, and publishes
//! one [`Notification`] per mutation outcome. Every successful response
//! replaces the cached cart wholesale.

pub mod api;
pub mod errors;
pub mod http;
pub mod models;
pub mod summary;
pub mod sync;

pub use api::CartApi;
pub use errors::{CartApiError, SyncError};
pub use http::{HttpCartApi, HttpCartApiConfig};
pub use models::{Cart, CartItem, EquipmentSummary};
pub use summary::{CartSummary, FormattedSummary, SummaryError};
pub use sync::{CartState, CartSync, FailureKind, InFlightKey, Notification, Operation, SyncConfig};
