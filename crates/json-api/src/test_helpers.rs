//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use innkeep_app::{
    auth::{MockAuthService, VenueContext},
    context::AppContext,
    domain::{
        customers::{
            MockCustomersService,
            records::{CustomerRecord, CustomerUuid},
        },
        promos::{
            MockPromosService,
            records::{PromoKind, PromoSummary, PromoUuid},
        },
        tiers::{
            MockTiersService,
            records::{DiscountType, TierResult},
        },
        transactions::MockTransactionsService,
        venues::{MockVenuesService, records::VenueUuid},
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_VENUE_UUID: VenueUuid = VenueUuid::from_uuid(Uuid::nil());

pub(crate) fn test_venue() -> VenueContext {
    VenueContext {
        uuid: TEST_VENUE_UUID,
        name: "Test Venue".to_string(),
    }
}

/// Middleware standing in for auth: injects the test venue.
#[salvo::handler]
pub(crate) async fn inject_venue(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_venue(test_venue());
    ctrl.call_next(req, depot, res).await;
}

/// One mock per service; mockall panics on any call without an expectation,
/// so unused services are strict by default.
pub(crate) struct TestApp {
    pub auth: MockAuthService,
    pub venues: MockVenuesService,
    pub tiers: MockTiersService,
    pub customers: MockCustomersService,
    pub promos: MockPromosService,
    pub transactions: MockTransactionsService,
}

impl Default for TestApp {
    fn default() -> Self {
        Self {
            auth: MockAuthService::new(),
            venues: MockVenuesService::new(),
            tiers: MockTiersService::new(),
            customers: MockCustomersService::new(),
            promos: MockPromosService::new(),
            transactions: MockTransactionsService::new(),
        }
    }
}

impl TestApp {
    pub(crate) fn into_state(self) -> Arc<State> {
        Arc::new(State::new(AppContext {
            auth: Arc::new(self.auth),
            venues: Arc::new(self.venues),
            tiers: Arc::new(self.tiers),
            customers: Arc::new(self.customers),
            promos: Arc::new(self.promos),
            transactions: Arc::new(self.transactions),
        }))
    }

    /// Build a service around a route with state and a pre-injected venue.
    pub(crate) fn into_service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(inject_venue)
                .push(route),
        )
    }
}

pub(crate) fn make_customer(uuid: CustomerUuid) -> CustomerRecord {
    CustomerRecord {
        uuid,
        home_venue_uuid: TEST_VENUE_UUID,
        name: "John Smith".to_string(),
        email: Some("john@example.com".to_string()),
        phone: None,
        dob: None,
        qr_code: Some("IKABCDEF123456".to_string()),
        is_staff: false,
        is_active: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_tier_result() -> TierResult {
    TierResult {
        tier_name: "Loyalty".to_string(),
        rank: 2,
        is_staff: false,
        discount_type: DiscountType::Discount,
        wet_discount: 8.0,
        dry_discount: 15.0,
        visits: 3,
        window_days: 28,
        home_venue_name: "Number Four".to_string(),
        home_tier_name: "Loyalty".to_string(),
        visiting_tier_name: "Member".to_string(),
    }
}

pub(crate) fn make_promo_summary(code: &str) -> PromoSummary {
    PromoSummary {
        uuid: PromoUuid::new(),
        code: code.to_string(),
        name: "Summer promo".to_string(),
        description: Some("15% off everything".to_string()),
        kind: PromoKind::PromoCode {
            wet_discount: 15.0,
            dry_discount: 15.0,
        },
        min_spend: None,
        valid_until: None,
        targeted: false,
        expires_at: None,
    }
}
