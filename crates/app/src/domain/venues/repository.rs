//! Venues Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::venues::{
    data::NewVenue,
    records::{VenueRecord, VenueUuid},
};

const CREATE_VENUE_SQL: &str = include_str!("sql/create_venue.sql");
const GET_VENUE_SQL: &str = include_str!("sql/get_venue.sql");
const DEACTIVATE_VENUE_SQL: &str = include_str!("sql/deactivate_venue.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVenuesRepository;

impl PgVenuesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_venue(
        &self,
        pool: &PgPool,
        venue: NewVenue,
    ) -> Result<VenueRecord, sqlx::Error> {
        query_as::<Postgres, VenueRecord>(CREATE_VENUE_SQL)
            .bind(venue.uuid.into_uuid())
            .bind(venue.name)
            .bind(venue.api_key_hash)
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn get_venue(
        &self,
        pool: &PgPool,
        venue: VenueUuid,
    ) -> Result<VenueRecord, sqlx::Error> {
        query_as::<Postgres, VenueRecord>(GET_VENUE_SQL)
            .bind(venue.into_uuid())
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn deactivate_venue(
        &self,
        pool: &PgPool,
        venue: VenueUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_VENUE_SQL)
            .bind(venue.into_uuid())
            .execute(pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for VenueRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VenueUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
