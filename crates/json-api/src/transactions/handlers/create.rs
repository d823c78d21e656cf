//! Record Transaction Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::{
    customers::records::CustomerUuid,
    tiers::records::DiscountType,
    transactions::data::{NewLineItem, NewTransaction},
};

use crate::{extensions::*, state::State, transactions::errors::into_status_error};

/// One line item on a sale.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LineItemRequest {
    pub product_name: String,
    pub product_group: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: f64,

    /// Unit price in minor units
    #[serde(default)]
    pub price: i64,

    #[serde(default)]
    pub is_wet: bool,
}

fn default_quantity() -> f64 {
    1.0
}

impl From<LineItemRequest> for NewLineItem {
    fn from(item: LineItemRequest) -> Self {
        NewLineItem {
            product_name: item.product_name,
            product_group: item.product_group,
            quantity: item.quantity,
            price: item.price,
            is_wet: item.is_wet,
        }
    }
}

/// Record Transaction Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RecordTransactionRequest {
    pub customer_uuid: Uuid,

    /// Terminal-side ticket reference
    pub ticket_ref: Option<String>,

    /// Amounts in minor units
    pub total_amount: i64,

    #[serde(default)]
    pub wet_total: i64,

    #[serde(default)]
    pub dry_total: i64,

    #[serde(default)]
    pub discount_amount: i64,

    /// "discount", "promo", or "staff"
    #[serde(default = "default_discount_type")]
    pub discount_type: String,

    pub tier_at_visit: Option<String>,
    pub promo_code: Option<String>,

    #[serde(default)]
    pub items: Vec<LineItemRequest>,
}

fn default_discount_type() -> String {
    DiscountType::Discount.as_str().to_string()
}

/// Transaction Recorded Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TransactionRecordedResponse {
    pub transaction_uuid: Uuid,
}

/// Record Transaction Handler
///
/// Logs one completed sale against the calling venue.
#[endpoint(
    tags("transactions"),
    summary = "Record Transaction",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Transaction recorded"),
        (status_code = StatusCode::NOT_FOUND, description = "Customer not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RecordTransactionRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<TransactionRecordedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let venue = depot.venue_or_401()?;
    let request = json.into_inner();

    let discount_type: DiscountType = request
        .discount_type
        .parse()
        .or_400("unknown discount_type")?;

    let transaction = NewTransaction {
        customer_uuid: CustomerUuid::from_uuid(request.customer_uuid),
        venue_uuid: venue.uuid,
        ticket_ref: request.ticket_ref,
        total_amount: request.total_amount,
        wet_total: request.wet_total,
        dry_total: request.dry_total,
        discount_amount: request.discount_amount,
        discount_type,
        tier_at_visit: request.tier_at_visit,
        promo_code: request.promo_code,
        items: request.items.into_iter().map(Into::into).collect(),
    };

    let transaction_uuid = state
        .app
        .transactions
        .record(transaction)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(TransactionRecordedResponse {
        transaction_uuid: transaction_uuid.into(),
    }))
}
