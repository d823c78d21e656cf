//! Promos Data

use jiff::{Timestamp, civil::Time, civil::Weekday};
use smallvec::SmallVec;

use crate::domain::{
    promos::records::{PromoKind, PromoUuid},
    venues::records::VenueUuid,
};

/// New Promo Data
#[derive(Debug, Clone)]
pub struct NewPromo {
    pub uuid: PromoUuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: PromoKind,
    pub venue_uuid: Option<VenueUuid>,
    pub min_spend: Option<i64>,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
    pub time_start: Option<Time>,
    pub time_end: Option<Time>,
    pub valid_days: SmallVec<[Weekday; 7]>,
    pub max_uses: Option<i64>,
    pub max_uses_per_customer: Option<i64>,
    pub requires_membership: bool,
}
