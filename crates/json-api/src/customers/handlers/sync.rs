//! Sync Customers Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::customers::records::SyncCustomer;

use crate::{customers::errors::into_status_error, extensions::*, state::State};

/// One customer in a sync batch.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SyncCustomerResponse {
    pub customer_uuid: Uuid,
    pub name: String,
    pub qr_code: Option<String>,

    /// Active RFID values
    pub rfid_values: Vec<String>,

    pub is_staff: bool,
    pub home_venue_uuid: Uuid,
    pub home_venue: String,
    pub updated_at: String,
}

impl From<SyncCustomer> for SyncCustomerResponse {
    fn from(customer: SyncCustomer) -> Self {
        Self {
            customer_uuid: customer.uuid.into(),
            name: customer.name,
            qr_code: customer.qr_code,
            rfid_values: customer.rfid_values,
            is_staff: customer.is_staff,
            home_venue_uuid: customer.home_venue_uuid.into(),
            home_venue: customer.home_venue_name,
            updated_at: customer.updated_at.to_string(),
        }
    }
}

/// Sync Customers Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SyncResponse {
    pub customers: Vec<SyncCustomerResponse>,
    pub count: usize,

    /// Server time to pass back as `updated_since` on the next call
    pub sync_time: String,
}

/// Sync Customers Handler
///
/// Bulk or incremental customer export for terminal-side offline caching.
#[endpoint(
    tags("customers"),
    summary = "Sync Customers",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Customer batch"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad cursor"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    updated_since: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<SyncResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let _venue = depot.venue_or_401()?;
    let updated_since = updated_since.into_updated_since()?;

    let batch = state
        .app
        .customers
        .sync(updated_since)
        .await
        .map_err(into_status_error)?;

    let customers: Vec<SyncCustomerResponse> =
        batch.customers.into_iter().map(Into::into).collect();

    Ok(Json(SyncResponse {
        count: customers.len(),
        customers,
        sync_time: batch.sync_time.to_string(),
    }))
}
