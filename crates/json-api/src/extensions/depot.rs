//! Depot helper extensions.

use std::any::Any;

use innkeep_app::auth::VenueContext;
use salvo::prelude::{Depot, StatusError};

/// Helpers for typed depot access and failure mapping.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Attach the authenticated venue to the request.
    fn insert_venue(&mut self, venue: VenueContext);

    /// The authenticated venue, or 401 when the auth middleware did not run.
    fn venue_or_401(&self) -> Result<VenueContext, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_venue(&mut self, venue: VenueContext) {
        self.inject(venue);
    }

    fn venue_or_401(&self) -> Result<VenueContext, StatusError> {
        self.obtain::<VenueContext>()
            .cloned()
            .map_err(|_ignored| StatusError::unauthorized())
    }
}
