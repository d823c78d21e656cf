//! Promo response shapes shared across endpoints.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innkeep_app::domain::promos::records::{PromoKind, PromoSummary};

/// Promo as returned to terminals. Kind-specific discount fields are
/// flattened with zero defaults so terminal scripts can read them without
/// branching.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromoSummaryResponse {
    pub uuid: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,

    /// "loyalty_bonus" or "promo_code"
    pub kind: String,

    pub wet_discount: f64,
    pub dry_discount: f64,
    pub bonus_multiplier: Option<f64>,
    pub bonus_add_wet: f64,
    pub bonus_add_dry: f64,

    /// Minimum spend in minor units
    pub min_spend: Option<i64>,

    pub valid_until: Option<String>,

    /// Whether this promo reached the customer via a targeted assignment
    pub targeted: bool,

    /// Assignment expiry, when targeted
    pub expires_at: Option<String>,
}

impl From<PromoSummary> for PromoSummaryResponse {
    fn from(summary: PromoSummary) -> Self {
        let kind = summary.kind.type_as_str().to_string();

        let (wet_discount, dry_discount, bonus_multiplier, bonus_add_wet, bonus_add_dry) =
            match summary.kind {
                PromoKind::PromoCode {
                    wet_discount,
                    dry_discount,
                } => (wet_discount, dry_discount, None, 0.0, 0.0),
                PromoKind::LoyaltyBonus {
                    multiplier,
                    add_wet,
                    add_dry,
                } => (0.0, 0.0, multiplier, add_wet, add_dry),
            };

        Self {
            uuid: summary.uuid.into(),
            code: summary.code,
            name: summary.name,
            description: summary.description,
            kind,
            wet_discount,
            dry_discount,
            bonus_multiplier,
            bonus_add_wet,
            bonus_add_dry,
            min_spend: summary.min_spend,
            valid_until: summary.valid_until.as_ref().map(ToString::to_string),
            targeted: summary.targeted,
            expires_at: summary.expires_at.as_ref().map(ToString::to_string),
        }
    }
}
