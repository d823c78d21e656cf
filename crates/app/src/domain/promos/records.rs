//! Promo Records

use jiff::{Timestamp, civil::Time, civil::Weekday};
use smallvec::SmallVec;

use crate::{domain::venues::records::VenueUuid, uuids::TypedUuid};

/// Promo UUID
pub type PromoUuid = TypedUuid<PromoRecord>;

/// Discriminator values stored in the `kind` column.
pub(crate) const LOYALTY_BONUS_KIND: &str = "loyalty_bonus";
pub(crate) const PROMO_CODE_KIND: &str = "promo_code";

/// Kind-specific promo payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PromoKind {
    /// Boosts an existing tier discount. Additive percentages win over the
    /// multiplier when either is non-zero; classification stays "discount".
    LoyaltyBonus {
        multiplier: Option<f64>,
        add_wet: f64,
        add_dry: f64,
    },

    /// Fixed-rate discount replacing any tier discount; classification
    /// becomes "promo". Usable by guests unless membership is required.
    PromoCode { wet_discount: f64, dry_discount: f64 },
}

impl PromoKind {
    #[must_use]
    pub const fn type_as_str(&self) -> &'static str {
        match self {
            Self::LoyaltyBonus { .. } => LOYALTY_BONUS_KIND,
            Self::PromoCode { .. } => PROMO_CODE_KIND,
        }
    }
}

/// Promo Record
#[derive(Debug, Clone, PartialEq)]
pub struct PromoRecord {
    pub uuid: PromoUuid,

    /// Stored upper-cased; lookups are case-insensitive.
    pub code: String,

    pub name: String,
    pub description: Option<String>,
    pub kind: PromoKind,

    /// None scopes the promo to every venue.
    pub venue_uuid: Option<VenueUuid>,

    /// Minimum transaction amount in minor units.
    pub min_spend: Option<i64>,

    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,

    /// Wall-clock bounds; a start after the end matches nothing.
    pub time_start: Option<Time>,
    pub time_end: Option<Time>,

    /// Empty means every day is valid.
    pub valid_days: SmallVec<[Weekday; 7]>,

    pub max_uses: Option<i64>,
    pub max_uses_per_customer: Option<i64>,
    pub requires_membership: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// Targeted assignment marker for typed uuids.
#[derive(Debug, Clone)]
pub struct PromoAssignmentRecord {}

/// Promo Assignment UUID
pub type PromoAssignmentUuid = TypedUuid<PromoAssignmentRecord>;

/// Usage ledger marker for typed uuids.
#[derive(Debug, Clone)]
pub struct PromoUsageRecord {}

/// Promo Usage UUID
pub type PromoUsageUuid = TypedUuid<PromoUsageRecord>;

/// A promo joined with its targeted assignment for one customer.
#[derive(Debug, Clone)]
pub(crate) struct TargetedPromo {
    pub promo: PromoRecord,
    pub assigned_expires_at: Option<Timestamp>,
}

/// Promo as surfaced to a terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoSummary {
    pub uuid: PromoUuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: PromoKind,
    pub min_spend: Option<i64>,
    pub valid_until: Option<Timestamp>,

    /// Whether this promo reached the customer via a targeted assignment.
    pub targeted: bool,

    /// Assignment expiry, when targeted.
    pub expires_at: Option<Timestamp>,
}

impl PromoSummary {
    #[must_use]
    pub(crate) fn from_parts(
        promo: &PromoRecord,
        targeted: bool,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            uuid: promo.uuid,
            code: promo.code.clone(),
            name: promo.name.clone(),
            description: promo.description.clone(),
            kind: promo.kind.clone(),
            min_spend: promo.min_spend,
            valid_until: promo.valid_until,
            targeted,
            expires_at,
        }
    }
}

/// Discount rates produced by applying a promo.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromo {
    pub code: String,
    pub name: String,
    pub discount_type: crate::domain::tiers::records::DiscountType,
    pub wet_discount: f64,
    pub dry_discount: f64,
}

/// The best auto-applicable loyalty bonus for a customer right now.
#[derive(Debug, Clone, PartialEq)]
pub struct BestBonus {
    pub promo: PromoSummary,
    pub wet_discount: f64,
    pub dry_discount: f64,
}
