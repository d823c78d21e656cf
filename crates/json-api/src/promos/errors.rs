//! Promo endpoint error mapping.

use salvo::http::StatusError;
use tracing::error;

use innkeep_app::domain::promos::PromosServiceError;

pub(crate) fn into_status_error(error: PromosServiceError) -> StatusError {
    match error {
        PromosServiceError::Rejected(rejection) => {
            StatusError::bad_request().brief(rejection.to_string())
        }
        PromosServiceError::NotFound => StatusError::not_found().brief("Promo not found"),
        PromosServiceError::AlreadyExists => StatusError::conflict().brief("Promo already exists"),
        PromosServiceError::InvalidReference
        | PromosServiceError::BonusWithoutMembership
        | PromosServiceError::MissingRequiredData
        | PromosServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid promo payload")
        }
        PromosServiceError::Sql(source) => {
            error!("promo storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
