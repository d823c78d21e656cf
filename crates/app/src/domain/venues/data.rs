//! Venues Data

use crate::domain::venues::records::VenueUuid;

/// New Venue Data
#[derive(Debug, Clone)]
pub struct NewVenue {
    pub uuid: VenueUuid,
    pub name: String,
    pub api_key_hash: String,
}
