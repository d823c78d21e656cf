//! Register Customer Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::customers::data::NewRegistration;

use crate::{customers::errors::into_status_error, extensions::*, state::State};

/// Tier every new customer starts on.
const INITIAL_TIER: &str = "Member";

/// Register Customer Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Date of birth, YYYY-MM-DD
    pub dob: Option<String>,

    /// Physical fob to attach right away
    pub rfid: Option<String>,
}

impl From<RegisterRequest> for NewRegistration {
    fn from(request: RegisterRequest) -> Self {
        NewRegistration {
            name: request.name,
            email: request.email,
            phone: request.phone,
            dob: request.dob,
            rfid: request.rfid,
        }
    }
}

/// Register Customer Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterResponse {
    pub customer_uuid: Uuid,
    pub name: String,

    /// Generated QR credential for the customer's app
    pub qr_code: String,

    /// The calling venue becomes the home venue
    pub home_venue: String,

    /// Always "Member"
    pub tier: String,
}

/// Register Customer Handler
#[endpoint(
    tags("customers"),
    summary = "Register Customer",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Customer registered"),
        (status_code = StatusCode::CONFLICT, description = "Duplicate email or RFID"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RegisterResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let venue = depot.venue_or_401()?;

    let customer = state
        .app
        .customers
        .register(venue.uuid, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(RegisterResponse {
        customer_uuid: customer.uuid.into(),
        name: customer.name,
        qr_code: customer.qr_code.unwrap_or_default(),
        home_venue: venue.name,
        tier: INITIAL_TIER.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use innkeep_app::domain::customers::{
        CustomersServiceError, MockCustomersService, records::CustomerUuid,
    };

    use crate::test_helpers::{TEST_VENUE_UUID, TestApp, make_customer};

    use super::*;

    fn make_service(customers: MockCustomersService) -> Service {
        let app = TestApp {
            customers,
            ..TestApp::default()
        };

        app.into_service(Router::with_path("register").post(handler))
    }

    #[tokio::test]
    async fn test_register_returns_201_with_qr_code() -> TestResult {
        let uuid = CustomerUuid::new();
        let customer = make_customer(uuid);

        let mut customers = MockCustomersService::new();

        customers
            .expect_register()
            .once()
            .withf(move |venue, registration| {
                *venue == TEST_VENUE_UUID
                    && registration.name == "John Smith"
                    && registration.email.as_deref() == Some("john@example.com")
                    && registration.rfid.as_deref() == Some("0123456789")
            })
            .return_once(move |_, _| Ok(customer));

        let mut res = TestClient::post("http://example.com/register")
            .json(&json!({
                "name": "John Smith",
                "email": "john@example.com",
                "rfid": "0123456789",
            }))
            .send(&make_service(customers))
            .await;

        let body: RegisterResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.customer_uuid, uuid.into_uuid());
        assert_eq!(body.qr_code, "IKABCDEF123456");
        assert_eq!(body.home_venue, "Test Venue");
        assert_eq!(body.tier, "Member");

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_returns_409() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_register()
            .once()
            .return_once(|_, _| Err(CustomersServiceError::DuplicateEmail));

        let res = TestClient::post("http://example.com/register")
            .json(&json!({ "name": "Jane", "email": "taken@example.com" }))
            .send(&make_service(customers))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_rfid_returns_409() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_register()
            .once()
            .return_once(|_, _| Err(CustomersServiceError::DuplicateRfid));

        let res = TestClient::post("http://example.com/register")
            .json(&json!({ "name": "Jane", "rfid": "0123456789" }))
            .send(&make_service(customers))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_name_returns_400() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_register()
            .once()
            .return_once(|_, _| Err(CustomersServiceError::MissingRequiredData));

        let res = TestClient::post("http://example.com/register")
            .json(&json!({ "name": "" }))
            .send(&make_service(customers))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
