//! Venue Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Venue UUID
pub type VenueUuid = TypedUuid<VenueRecord>;

/// Venue Record
#[derive(Debug, Clone)]
pub struct VenueRecord {
    /// Unique venue identifier.
    pub uuid: VenueUuid,

    /// Human-readable venue name.
    pub name: String,

    /// Inactive venues reject all API calls.
    pub is_active: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
