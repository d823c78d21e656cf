//! Customer endpoint error mapping.

use salvo::http::StatusError;
use tracing::error;

use innkeep_app::domain::{customers::CustomersServiceError, tiers::TiersServiceError};

pub(crate) fn into_status_error(error: CustomersServiceError) -> StatusError {
    match error {
        CustomersServiceError::NotFound => StatusError::not_found().brief("Customer not found"),
        CustomersServiceError::DuplicateEmail => {
            StatusError::conflict().brief("A customer with this email already exists")
        }
        CustomersServiceError::DuplicateRfid => {
            StatusError::conflict().brief("This RFID code is already registered")
        }
        CustomersServiceError::DuplicateIdentifier => {
            StatusError::conflict().brief("This identifier value is already in use")
        }
        CustomersServiceError::MissingRequiredData | CustomersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid customer payload")
        }
        CustomersServiceError::QrCodesExhausted => {
            error!("exhausted QR code generation attempts");

            StatusError::internal_server_error()
        }
        CustomersServiceError::Sql(source) => {
            error!("customer storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn tiers_into_status_error(error: TiersServiceError) -> StatusError {
    match error {
        TiersServiceError::NotFound => StatusError::not_found().brief("Customer not found"),
        TiersServiceError::InvalidReference
        | TiersServiceError::MissingRequiredData
        | TiersServiceError::InvalidData => StatusError::bad_request(),
        TiersServiceError::Sql(source) => {
            error!("tier resolution storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
