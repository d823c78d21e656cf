//! Validate Promo Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::{customers::records::CustomerUuid, promos::PromosServiceError};

use crate::{
    extensions::*,
    promos::{errors::into_status_error, responses::PromoSummaryResponse},
    state::State,
};

/// Validate Promo Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidatePromoRequest {
    pub code: String,

    /// Known customer, for per-customer limits and membership checks
    pub customer_uuid: Option<Uuid>,

    /// Ticket total in minor units; enables the min-spend check
    pub total_amount: Option<i64>,
}

/// Validate Promo Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidatePromoResponse {
    pub valid: bool,
    pub promo: Option<PromoSummaryResponse>,
    pub error: Option<String>,
}

/// Validate Promo Handler
///
/// Checks a promo code against every restriction and reports the first
/// failure as a terminal-facing message.
#[endpoint(
    tags("promos"),
    summary = "Validate Promo",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo is valid"),
        (status_code = StatusCode::BAD_REQUEST, description = "Promo is not valid"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ValidatePromoRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ValidatePromoResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let venue = depot.venue_or_401()?;
    let request = json.into_inner();

    let customer = request.customer_uuid.map(CustomerUuid::from_uuid);

    match state
        .app
        .promos
        .validate(&request.code, customer, venue.uuid, request.total_amount)
        .await
    {
        Ok(promo) => Ok(Json(ValidatePromoResponse {
            valid: true,
            promo: Some(promo.into()),
            error: None,
        })),
        Err(PromosServiceError::Rejected(rejection)) => {
            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(ValidatePromoResponse {
                valid: false,
                promo: None,
                error: Some(rejection.to_string()),
            }))
        }
        Err(error) => Err(into_status_error(error)),
    }
}
