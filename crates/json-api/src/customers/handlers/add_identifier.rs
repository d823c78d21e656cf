//! Add Identifier Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::{JsonBody, PathParam}},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::customers::data::NewIdentifier;

use crate::{customers::errors::into_status_error, extensions::*, state::State};

/// Add Identifier Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddIdentifierRequest {
    /// RFID value to attach
    pub value: String,

    /// Free-form label ("spare fob", "keyring")
    pub label: Option<String>,
}

/// Identifier Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IdentifierCreatedResponse {
    pub identifier_uuid: Uuid,
}

/// Add Identifier Handler
///
/// Attaches an additional RFID credential to an existing customer.
#[endpoint(
    tags("customers"),
    summary = "Add Identifier",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Identifier added"),
        (status_code = StatusCode::NOT_FOUND, description = "Customer not found"),
        (status_code = StatusCode::CONFLICT, description = "Identifier value already in use"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    customer: PathParam<Uuid>,
    json: JsonBody<AddIdentifierRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<IdentifierCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let _venue = depot.venue_or_401()?;
    let request = json.into_inner();

    let identifier = state
        .app
        .customers
        .add_identifier(
            customer.into_inner().into(),
            NewIdentifier {
                value: request.value,
                label: request.label,
            },
        )
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(IdentifierCreatedResponse {
        identifier_uuid: identifier.uuid.into(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use innkeep_app::domain::customers::{
        CustomersServiceError, MockCustomersService,
        records::{CustomerUuid, IdentifierRecord, IdentifierUuid},
    };

    use crate::test_helpers::TestApp;

    use super::*;

    fn make_service(customers: MockCustomersService) -> Service {
        let app = TestApp {
            customers,
            ..TestApp::default()
        };

        app.into_service(
            Router::with_path("customers")
                .push(Router::with_path("{customer}").push(Router::with_path("identifiers").post(handler))),
        )
    }

    #[tokio::test]
    async fn test_add_identifier_returns_201() -> TestResult {
        let customer = CustomerUuid::new();
        let identifier = IdentifierUuid::new();

        let mut customers = MockCustomersService::new();

        customers
            .expect_add_identifier()
            .once()
            .withf(move |uuid, new| {
                *uuid == customer
                    && new.value == "0099887766"
                    && new.label.as_deref() == Some("spare fob")
            })
            .return_once(move |uuid, new| {
                Ok(IdentifierRecord {
                    uuid: identifier,
                    customer_uuid: uuid,
                    value: new.value,
                    label: new.label,
                    is_active: true,
                })
            });

        let mut res = TestClient::post(format!(
            "http://example.com/customers/{customer}/identifiers"
        ))
        .json(&json!({ "value": "0099887766", "label": "spare fob" }))
        .send(&make_service(customers))
        .await;

        let body: IdentifierCreatedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.identifier_uuid, identifier.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_customer_returns_404() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_add_identifier()
            .once()
            .return_once(|_, _| Err(CustomersServiceError::NotFound));

        let res = TestClient::post(format!(
            "http://example.com/customers/{}/identifiers",
            CustomerUuid::new()
        ))
        .json(&json!({ "value": "0099887766" }))
        .send(&make_service(customers))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_value_returns_409() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_add_identifier()
            .once()
            .return_once(|_, _| Err(CustomersServiceError::DuplicateIdentifier));

        let res = TestClient::post(format!(
            "http://example.com/customers/{}/identifiers",
            CustomerUuid::new()
        ))
        .json(&json!({ "value": "0099887766" }))
        .send(&make_service(customers))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
