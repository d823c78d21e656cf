//! Identify Customer Handler
//!
//! The main terminal flow: a scanned RFID fob, QR code, or typed email is
//! resolved to a customer, their tier and rates are computed for the calling
//! venue, and any offerable promos, auto-applicable bonus, and next-tier
//! nudge are attached.

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::{
    promos::records::BestBonus,
    tiers::records::{NextTierInfo, TierResult},
};

use crate::{
    customers::errors::{into_status_error, tiers_into_status_error},
    extensions::*,
    promos::{errors::into_status_error as promos_into_status_error, responses::PromoSummaryResponse},
    state::State,
};

/// Identify Customer Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IdentifyRequest {
    /// Scanned or typed value: RFID code, QR code, or email
    pub identifier: String,
}

/// Next tier nudge ("2 more visits to reach Loyalty!")
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NextTierResponse {
    pub tier: String,
    pub visits_to_go: i64,
}

impl From<NextTierInfo> for NextTierResponse {
    fn from(info: NextTierInfo) -> Self {
        Self {
            tier: info.tier_name,
            visits_to_go: info.visits_to_go,
        }
    }
}

/// Auto-applicable loyalty bonus surfaced with the tier rates.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BonusResponse {
    pub code: String,
    pub name: String,

    /// Boosted rates when this bonus is applied
    pub wet_discount: f64,
    pub dry_discount: f64,
}

impl From<BestBonus> for BonusResponse {
    fn from(bonus: BestBonus) -> Self {
        Self {
            code: bonus.promo.code,
            name: bonus.promo.name,
            wet_discount: bonus.wet_discount,
            dry_discount: bonus.dry_discount,
        }
    }
}

/// Identify Customer Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IdentifyResponse {
    pub customer_uuid: Uuid,
    pub name: String,
    pub email: Option<String>,

    /// Resolved tier name (Member/Loyalty/Regular/Staff)
    pub tier: String,

    pub is_staff: bool,

    /// Rates from the calling venue for the resolved tier
    pub wet_discount: f64,
    pub dry_discount: f64,

    /// "discount" or "staff"
    pub discount_type: String,

    /// Visits across all venues inside the rolling window
    pub visits: i64,
    pub window_days: i32,

    pub home_venue: String,

    /// Offerable promo-code promos
    pub available_promos: Vec<PromoSummaryResponse>,

    /// Best auto-applicable loyalty bonus, when one exists
    pub bonus: Option<BonusResponse>,

    pub next_tier: Option<NextTierResponse>,
}

/// Identify Customer Handler
#[endpoint(
    tags("customers"),
    summary = "Identify Customer",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Customer identified"),
        (status_code = StatusCode::NOT_FOUND, description = "No customer matches the identifier"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<IdentifyRequest>,
    depot: &mut Depot,
) -> Result<Json<IdentifyResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let venue = depot.venue_or_401()?;
    let request = json.into_inner();

    let customer = state
        .app
        .customers
        .resolve_identifier(&request.identifier)
        .await
        .map_err(into_status_error)?;

    let tier: TierResult = state
        .app
        .tiers
        .resolve(customer.uuid, venue.uuid)
        .await
        .map_err(tiers_into_status_error)?;

    let available_promos = state
        .app
        .promos
        .list_available(Some(customer.uuid), venue.uuid)
        .await
        .map_err(promos_into_status_error)?;

    let (bonus, next_tier) = if tier.is_staff {
        (None, None)
    } else {
        let bonus = state
            .app
            .promos
            .best_customer_bonus(customer.uuid, venue.uuid, tier.wet_discount, tier.dry_discount)
            .await
            .map_err(promos_into_status_error)?;

        let next_tier = state
            .app
            .tiers
            .next_tier(customer.uuid, venue.uuid)
            .await
            .map_err(tiers_into_status_error)?;

        (bonus, next_tier)
    };

    Ok(Json(IdentifyResponse {
        customer_uuid: customer.uuid.into(),
        name: customer.name,
        email: customer.email,
        tier: tier.tier_name,
        is_staff: tier.is_staff,
        wet_discount: tier.wet_discount,
        dry_discount: tier.dry_discount,
        discount_type: tier.discount_type.as_str().to_string(),
        visits: tier.visits,
        window_days: tier.window_days,
        home_venue: tier.home_venue_name,
        available_promos: available_promos.into_iter().map(Into::into).collect(),
        bonus: bonus.map(Into::into),
        next_tier: next_tier.map(Into::into),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use innkeep_app::domain::{
        customers::{CustomersServiceError, MockCustomersService, records::CustomerUuid},
        promos::{MockPromosService, records::BestBonus},
        tiers::{
            MockTiersService,
            records::{DiscountType, NextTierInfo},
        },
    };

    use crate::test_helpers::{
        TEST_VENUE_UUID, TestApp, make_customer, make_promo_summary, make_tier_result,
    };

    use super::*;

    fn make_service(
        customers: MockCustomersService,
        tiers: MockTiersService,
        promos: MockPromosService,
    ) -> Service {
        let app = TestApp {
            customers,
            tiers,
            promos,
            ..TestApp::default()
        };

        app.into_service(Router::with_path("identify").post(handler))
    }

    #[tokio::test]
    async fn test_identify_member_returns_tier_promos_and_next_tier() -> TestResult {
        let uuid = CustomerUuid::new();
        let customer = make_customer(uuid);

        let mut customers = MockCustomersService::new();

        customers
            .expect_resolve_identifier()
            .once()
            .withf(|raw| raw == "0123456789")
            .return_once(move |_| Ok(customer));

        let mut tiers = MockTiersService::new();

        tiers
            .expect_resolve()
            .once()
            .withf(move |customer, venue| *customer == uuid && *venue == TEST_VENUE_UUID)
            .return_once(|_, _| Ok(make_tier_result()));

        tiers
            .expect_next_tier()
            .once()
            .return_once(|_, _| {
                Ok(Some(NextTierInfo {
                    tier_name: "Regular".to_string(),
                    visits_to_go: 2,
                }))
            });

        let mut promos = MockPromosService::new();

        promos
            .expect_list_available()
            .once()
            .withf(move |customer, venue| {
                *customer == Some(uuid) && *venue == TEST_VENUE_UUID
            })
            .return_once(|_, _| Ok(vec![make_promo_summary("SUMMER24")]));

        promos
            .expect_best_customer_bonus()
            .once()
            .withf(move |customer, _venue, base_wet, base_dry| {
                *customer == uuid
                    && (*base_wet - 8.0).abs() < f64::EPSILON
                    && (*base_dry - 15.0).abs() < f64::EPSILON
            })
            .return_once(|_, _, _, _| {
                Ok(Some(BestBonus {
                    promo: make_promo_summary("LUNCH2X"),
                    wet_discount: 16.0,
                    dry_discount: 30.0,
                }))
            });

        let mut res = TestClient::post("http://example.com/identify")
            .json(&json!({ "identifier": "0123456789" }))
            .send(&make_service(customers, tiers, promos))
            .await;

        let body: IdentifyResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.customer_uuid, uuid.into_uuid());
        assert_eq!(body.tier, "Loyalty");
        assert_eq!(body.discount_type, "discount");
        assert_eq!((body.wet_discount, body.dry_discount), (8.0, 15.0));
        assert_eq!(body.visits, 3);
        assert_eq!(body.window_days, 28);
        assert_eq!(body.home_venue, "Number Four");
        assert_eq!(body.available_promos.len(), 1);
        assert_eq!(
            body.bonus.map(|bonus| (bonus.code, bonus.wet_discount)),
            Some(("LUNCH2X".to_string(), 16.0))
        );
        assert_eq!(body.next_tier.map(|next| next.tier), Some("Regular".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_identify_staff_skips_bonus_and_next_tier() -> TestResult {
        let uuid = CustomerUuid::new();
        let mut customer = make_customer(uuid);
        customer.is_staff = true;

        let mut customers = MockCustomersService::new();

        customers
            .expect_resolve_identifier()
            .once()
            .return_once(move |_| Ok(customer));

        let mut tiers = MockTiersService::new();

        tiers.expect_resolve().once().return_once(|_, _| {
            Ok(TierResult {
                tier_name: "Staff".to_string(),
                rank: 0,
                is_staff: true,
                discount_type: DiscountType::Staff,
                wet_discount: 25.0,
                dry_discount: 30.0,
                visits: 0,
                window_days: 0,
                home_venue_name: "High Street".to_string(),
                home_tier_name: "Staff".to_string(),
                visiting_tier_name: "Staff".to_string(),
            })
        });

        tiers.expect_next_tier().never();

        let mut promos = MockPromosService::new();

        promos
            .expect_list_available()
            .once()
            .return_once(|_, _| Ok(vec![]));

        promos.expect_best_customer_bonus().never();

        let mut res = TestClient::post("http://example.com/identify")
            .json(&json!({ "identifier": "staff-fob" }))
            .send(&make_service(customers, tiers, promos))
            .await;

        let body: IdentifyResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.is_staff);
        assert_eq!(body.discount_type, "staff");
        assert_eq!(body.visits, 0);
        assert!(body.bonus.is_none());
        assert!(body.next_tier.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_identifier_returns_404() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_resolve_identifier()
            .once()
            .return_once(|_| Err(CustomersServiceError::NotFound));

        let res = TestClient::post("http://example.com/identify")
            .json(&json!({ "identifier": "unknown" }))
            .send(&make_service(
                customers,
                MockTiersService::new(),
                MockPromosService::new(),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
