//! Cart endpoints.

pub(crate) mod errors;
pub(crate) mod handlers;
pub(crate) mod responses;

use sportspro_app::domain::carts::{CartsServiceError, models::Cart};

use crate::observability::{CartMutationOutcome, observe_cart_mutation};

/// Count a finished cart mutation, then hand the result back unchanged.
pub(crate) fn record_mutation(
    operation: &str,
    result: Result<Cart, CartsServiceError>,
) -> Result<Cart, CartsServiceError> {
    let outcome = match &result {
        Ok(_) => CartMutationOutcome::Applied,
        Err(CartsServiceError::Sql(_)) => CartMutationOutcome::Failed,
        Err(_) => CartMutationOutcome::Rejected,
    };

    observe_cart_mutation(operation, outcome);

    result
}
