//! Carts
//!
//! One cart per user, created on the first `add_item` and never deleted. The
//! service is the only writer of cart rows; every mutation recomputes the
//! totals from the stored lines before committing.

mod aggregate;
pub mod data;
pub mod errors;
pub mod models;
pub mod records;
mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
