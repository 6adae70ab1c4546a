//! SportsPro Domain Concerns

pub mod carts;
pub mod equipment;
pub mod users;
