//! Apply Promo Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::customers::records::CustomerUuid;

use crate::{extensions::*, promos::errors::into_status_error, state::State};

/// Apply Promo Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyPromoRequest {
    pub code: String,

    /// Required for loyalty-bonus promos
    pub customer_uuid: Option<Uuid>,

    /// Current tier discount to boost, for loyalty-bonus promos
    #[serde(default)]
    pub base_wet_discount: f64,

    #[serde(default)]
    pub base_dry_discount: f64,
}

/// Apply Promo Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyPromoResponse {
    /// "discount" when a bonus boosted the tier rates, "promo" when a
    /// promo-code discount replaced them
    pub discount_type: String,

    pub wet_discount: f64,
    pub dry_discount: f64,
    pub code: String,
    pub name: String,
}

/// Apply Promo Handler
///
/// Re-validates the code and computes the final discount rates.
#[endpoint(
    tags("promos"),
    summary = "Apply Promo",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Promo is not valid"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyPromoRequest>,
    depot: &mut Depot,
) -> Result<Json<ApplyPromoResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let venue = depot.venue_or_401()?;
    let request = json.into_inner();

    let customer = request.customer_uuid.map(CustomerUuid::from_uuid);

    let applied = state
        .app
        .promos
        .apply(
            &request.code,
            customer,
            venue.uuid,
            request.base_wet_discount,
            request.base_dry_discount,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(ApplyPromoResponse {
        discount_type: applied.discount_type.as_str().to_string(),
        wet_discount: applied.wet_discount,
        dry_discount: applied.dry_discount,
        code: applied.code,
        name: applied.name,
    }))
}
