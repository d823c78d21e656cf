//! Transaction endpoint error mapping.

use salvo::http::StatusError;
use tracing::error;

use innkeep_app::domain::transactions::TransactionsServiceError;

pub(crate) fn into_status_error(error: TransactionsServiceError) -> StatusError {
    match error {
        TransactionsServiceError::NotFound => {
            StatusError::not_found().brief("Customer not found")
        }
        TransactionsServiceError::InvalidReference
        | TransactionsServiceError::MissingRequiredData
        | TransactionsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid transaction payload")
        }
        TransactionsServiceError::Sql(source) => {
            error!("failed to record transaction: {source}");

            StatusError::internal_server_error()
        }
    }
}
