//! Auth middleware.
//!
//! Every operation is scoped to the venue presenting the API key; this gate
//! runs before any engine logic and attaches the resolved venue to the
//! request.

use std::sync::Arc;

use innkeep_app::auth::AuthServiceError;
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use crate::{extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(api_key) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    let venue = match state.app.auth.authenticate_api_key(api_key).await {
        Ok(venue) => venue,
        Err(AuthServiceError::NotFound) => {
            res.render(StatusError::unauthorized().brief("Invalid API key"));

            return;
        }
        Err(AuthServiceError::VenueInactive) => {
            res.render(StatusError::forbidden().brief("Venue is not active"));

            return;
        }
        Err(AuthServiceError::Sql(source)) => {
            error!("failed to validate api key: {source}");

            res.render(StatusError::internal_server_error());

            return;
        }
    };

    depot.insert_venue(venue);

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use innkeep_app::auth::{MockAuthService, VenueContext};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_VENUE_UUID, TestApp};

    use super::*;

    #[salvo::handler]
    async fn echo_venue(depot: &mut Depot, res: &mut Response) {
        let venue = depot
            .venue_or_401()
            .ok()
            .map_or_else(|| "missing".to_string(), |venue: VenueContext| venue.name);

        res.render(venue);
    }

    fn make_service(auth: MockAuthService) -> Service {
        let app = TestApp {
            auth,
            ..TestApp::default()
        };

        let state = app.into_state();

        let router = Router::new()
            .hoop(salvo::affix_state::inject(state))
            .hoop(handler)
            .push(Router::new().get(echo_venue));

        Service::new(router)
    }

    #[tokio::test]
    async fn test_missing_authorization_header_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_api_key().never();

        let res = TestClient::get("http://example.com")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_header_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_api_key().never();

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_key_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_api_key()
            .once()
            .withf(|api_key| api_key == "ik_nope")
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer ik_nope", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_venue_returns_403() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_api_key()
            .once()
            .return_once(|_| Err(AuthServiceError::VenueInactive));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer ik_old", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_valid_key_injects_venue_context() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_api_key()
            .once()
            .withf(|api_key| api_key == "ik_good")
            .return_once(|_| {
                Ok(VenueContext {
                    uuid: TEST_VENUE_UUID,
                    name: "High Street".to_string(),
                })
            });

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer ik_good", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "High Street");

        Ok(())
    }
}
