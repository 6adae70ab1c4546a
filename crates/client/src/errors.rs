//! Client errors.

use thiserror::Error;

/// Failure of a single cart API call.
#[derive(Debug, Error)]
pub enum CartApiError {
    /// Missing, revoked, or expired bearer token.
    #[error("not signed in")]
    Unauthenticated,

    /// Unknown equipment or line item.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the request payload, such as a quantity below one.
    #[error("invalid request: {0}")]
    InvalidArgument(String),

    /// The equipment is out of stock.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Any other non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("network error")]
    Transport(#[source] reqwest::Error),
}

impl CartApiError {
    /// Whether retrying the same request later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Unauthenticated
            | Self::NotFound(_)
            | Self::InvalidArgument(_)
            | Self::Unavailable(_) => false,
        }
    }
}

impl From<reqwest::Error> for CartApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

/// Outcome of a [`CartSync`](crate::CartSync) operation that did not update the cart.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No user is signed in; nothing was sent.
    #[error("sign in to use your cart")]
    SignedOut,

    /// A request for the same line item is still outstanding; nothing was sent.
    #[error("a request for this item is already in progress")]
    InFlight,

    /// Quantities must be at least one; nothing was sent.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    TimedOut,

    /// The user signed out, or signed in again, while the request was outstanding.
    #[error("session changed before the response arrived")]
    SessionChanged,

    #[error(transparent)]
    Api(#[from] CartApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_failures_are_retryable() {
        let server = CartApiError::Status {
            status: 503,
            message: "busy".to_owned(),
        };
        let client = CartApiError::Status {
            status: 422,
            message: "nope".to_owned(),
        };

        assert!(server.is_retryable(), "5xx should be retryable");
        assert!(!client.is_retryable(), "4xx should not be retryable");
        assert!(!CartApiError::Unavailable("out of stock".to_owned()).is_retryable());
        assert!(!CartApiError::Unauthenticated.is_retryable());
    }
}
