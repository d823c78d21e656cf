//! Auth repository.

use sqlx::{PgPool, query_as};
use uuid::Uuid;

use crate::{auth::models::VenueContext, domain::venues::records::VenueUuid};

const FIND_VENUE_BY_KEY_HASH_SQL: &str = include_str!("sql/find_venue_by_key_hash.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAuthRepository;

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Look up a venue by hashed API key. Returns the venue context and its
    /// active flag so the caller can distinguish unknown from disabled.
    pub(crate) async fn find_venue_by_key_hash(
        &self,
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<(VenueContext, bool)>, sqlx::Error> {
        let row: Option<(Uuid, String, bool)> = query_as(FIND_VENUE_BY_KEY_HASH_SQL)
            .bind(key_hash)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|(uuid, name, is_active)| {
            (
                VenueContext {
                    uuid: VenueUuid::from_uuid(uuid),
                    name,
                },
                is_active,
            )
        }))
    }
}
