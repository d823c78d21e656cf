//! Tier Records

use std::str::FromStr;

use thiserror::Error;

use crate::uuids::TypedUuid;

/// Tier UUID
pub type TierUuid = TypedUuid<TierRecord>;

/// Global tier catalog entry. Rank totally orders tiers; higher is better.
#[derive(Debug, Clone)]
pub struct TierRecord {
    pub uuid: TierUuid,
    pub name: String,
    pub slug: String,
    pub rank: i32,
}

/// A venue's threshold and rates for one global tier.
#[derive(Debug, Clone)]
pub struct VenueTierConfig {
    pub tier_uuid: TierUuid,
    pub tier_name: String,
    pub rank: i32,
    pub visits_required: i64,
    pub window_days: i32,
    pub wet_discount: f64,
    pub dry_discount: f64,
}

/// A venue's staff discount rates.
#[derive(Debug, Clone, Copy)]
pub struct StaffRates {
    pub wet_discount: f64,
    pub dry_discount: f64,
}

/// How an applied discount is classified for downstream accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    /// Ordinary loyalty tier discount, including boosted ones.
    Discount,
    /// Fixed promo-code discount replacing any tier discount.
    Promo,
    /// Staff rate.
    Staff,
}

impl DiscountType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::Promo => "promo",
            Self::Staff => "staff",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown discount type")]
pub struct UnknownDiscountType;

impl FromStr for DiscountType {
    type Err = UnknownDiscountType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "discount" => Ok(Self::Discount),
            "promo" => Ok(Self::Promo),
            "staff" => Ok(Self::Staff),
            _ => Err(UnknownDiscountType),
        }
    }
}

/// Outcome of tier resolution for a customer at a visiting venue.
#[derive(Debug, Clone)]
pub struct TierResult {
    /// Winning tier name ("Staff" for staff customers).
    pub tier_name: String,

    /// Winning tier rank; 0 for staff.
    pub rank: i32,

    pub is_staff: bool,
    pub discount_type: DiscountType,

    /// Rates from the visiting venue's config for the winning tier.
    pub wet_discount: f64,
    pub dry_discount: f64,

    /// Visits across all venues in the window; 0 for staff.
    pub visits: i64,
    pub window_days: i32,

    pub home_venue_name: String,

    /// Tier the customer qualified for at each venue, for diagnostics.
    pub home_tier_name: String,
    pub visiting_tier_name: String,
}

/// The next tier a customer can reach at a venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTierInfo {
    pub tier_name: String,

    /// May be zero or negative when the customer already meets the threshold
    /// but a higher-ranked tier was not selected by the home-venue rule.
    pub visits_to_go: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_type_round_trips_through_str() {
        for discount_type in [DiscountType::Discount, DiscountType::Promo, DiscountType::Staff] {
            assert_eq!(
                discount_type.as_str().parse::<DiscountType>().ok(),
                Some(discount_type)
            );
        }
    }

    #[test]
    fn discount_type_rejects_unknown_values() {
        assert!("loyalty".parse::<DiscountType>().is_err());
        assert!("".parse::<DiscountType>().is_err());
    }
}
