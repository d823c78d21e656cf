//! Venues service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::venues::{
        data::NewVenue,
        errors::VenuesServiceError,
        records::{VenueRecord, VenueUuid},
        repository::PgVenuesRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgVenuesService {
    db: Db,
    repository: PgVenuesRepository,
}

impl PgVenuesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgVenuesRepository::new(),
        }
    }
}

#[async_trait]
impl VenuesService for PgVenuesService {
    async fn create_venue(&self, venue: NewVenue) -> Result<VenueRecord, VenuesServiceError> {
        if venue.name.trim().is_empty() {
            return Err(VenuesServiceError::MissingRequiredData);
        }

        let record = self
            .repository
            .create_venue(self.db.pool(), venue)
            .await
            .map_err(VenuesServiceError::from)?;

        info!(venue_uuid = %record.uuid, "created venue");

        Ok(record)
    }

    async fn deactivate_venue(&self, venue: VenueUuid) -> Result<(), VenuesServiceError> {
        let rows_affected = self
            .repository
            .deactivate_venue(self.db.pool(), venue)
            .await
            .map_err(VenuesServiceError::from)?;

        if rows_affected == 0 {
            return Err(VenuesServiceError::NotFound);
        }

        info!(venue_uuid = %venue, "deactivated venue");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Venue administration operations.
pub trait VenuesService: Send + Sync {
    /// Creates a new venue with a pre-hashed API key.
    async fn create_venue(&self, venue: NewVenue) -> Result<VenueRecord, VenuesServiceError>;

    /// Marks a venue inactive; its API key stops authenticating.
    async fn deactivate_venue(&self, venue: VenueUuid) -> Result<(), VenuesServiceError>;
}
