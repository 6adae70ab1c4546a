//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::carts::data::InvalidQuantity;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// The line item is absent, or belongs to another user's cart.
    #[error("cart item not found")]
    NotFound,

    #[error("equipment not found")]
    EquipmentNotFound,

    #[error("equipment is out of stock")]
    Unavailable,

    #[error(transparent)]
    InvalidQuantity(#[from] InvalidQuantity),

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::EquipmentNotFound,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}

/// Catalog lookups report a missing row as a missing equipment item rather
/// than a missing line item.
pub(crate) fn equipment_lookup_error(error: Error) -> CartsServiceError {
    if matches!(error, Error::RowNotFound) {
        return CartsServiceError::EquipmentNotFound;
    }

    error.into()
}
