//! Authentication
//!
//! Bearer API tokens resolve to the user that owns them. Only a SHA-256
//! verifier of each token is stored; the raw token is shown once at issue time.

mod errors;
mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::*;
pub use service::*;
pub use token::*;
