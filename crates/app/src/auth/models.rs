//! Auth models.

use crate::domain::venues::records::VenueUuid;

/// Venue resolved from a presented API key; attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueContext {
    pub uuid: VenueUuid,
    pub name: String,
}
