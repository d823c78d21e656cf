//! Auth service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::{AuthServiceError, VenueContext, hash_api_key, repository::PgAuthRepository},
    database::Db,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
        }
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_api_key(&self, api_key: &str) -> Result<VenueContext, AuthServiceError> {
        let key_hash = hash_api_key(api_key);

        let (venue, is_active) = self
            .repository
            .find_venue_by_key_hash(self.db.pool(), &key_hash)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if !is_active {
            return Err(AuthServiceError::VenueInactive);
        }

        Ok(venue)
    }
}

#[automock]
#[async_trait]
/// Resolves opaque venue credentials before any engine logic runs.
pub trait AuthService: Send + Sync {
    /// Map a raw API key to the active venue that owns it.
    async fn authenticate_api_key(&self, api_key: &str) -> Result<VenueContext, AuthServiceError>;
}
