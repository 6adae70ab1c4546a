//! Auth service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// Unknown, revoked, expired, or malformed token.
    #[error("token not found")]
    NotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        if let Some(db_error) = error.as_database_error()
            && db_error.is_foreign_key_violation()
        {
            return Self::UserNotFound;
        }

        Self::Sql(error)
    }
}
