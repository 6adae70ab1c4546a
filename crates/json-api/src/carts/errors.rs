//! Errors

use salvo::http::StatusError;
use tracing::error;

use sportspro_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::EquipmentNotFound => {
            StatusError::not_found().brief("Equipment not found")
        }
        CartsServiceError::Unavailable => {
            StatusError::conflict().brief("Equipment is out of stock")
        }
        CartsServiceError::InvalidQuantity(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        CartsServiceError::InvalidData => StatusError::bad_request().brief("Invalid cart data"),
        CartsServiceError::Sql(source) => {
            error!("cart storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
