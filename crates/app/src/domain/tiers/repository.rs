//! Tiers Repository

use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::{
    tiers::{
        data::NewVenueTierConfig,
        records::{StaffRates, TierRecord, TierUuid, VenueTierConfig},
    },
    venues::records::VenueUuid,
};

const LIST_VENUE_TIER_CONFIGS_SQL: &str = include_str!("sql/list_venue_tier_configs.sql");
const GET_STAFF_RATES_SQL: &str = include_str!("sql/get_staff_rates.sql");
const GET_MEMBER_TIER_SQL: &str = include_str!("sql/get_member_tier.sql");
const SEED_TIERS_SQL: &str = include_str!("sql/seed_tiers.sql");
const UPSERT_VENUE_TIER_SQL: &str = include_str!("sql/upsert_venue_tier.sql");
const UPSERT_STAFF_RATES_SQL: &str = include_str!("sql/upsert_staff_rates.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTiersRepository;

impl PgTiersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// All tier configs at a venue, joined with the global catalog, rank
    /// ascending.
    pub(crate) async fn list_configs(
        &self,
        pool: &PgPool,
        venue: VenueUuid,
    ) -> Result<Vec<VenueTierConfig>, sqlx::Error> {
        query_as::<Postgres, VenueTierConfig>(LIST_VENUE_TIER_CONFIGS_SQL)
            .bind(venue.into_uuid())
            .fetch_all(pool)
            .await
    }

    pub(crate) async fn staff_rates(
        &self,
        pool: &PgPool,
        venue: VenueUuid,
    ) -> Result<Option<StaffRates>, sqlx::Error> {
        query_as::<Postgres, StaffRates>(GET_STAFF_RATES_SQL)
            .bind(venue.into_uuid())
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn member_tier(&self, pool: &PgPool) -> Result<Option<TierRecord>, sqlx::Error> {
        query_as::<Postgres, TierRecord>(GET_MEMBER_TIER_SQL)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn seed_tiers(&self, pool: &PgPool) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SEED_TIERS_SQL)
            .bind(TierUuid::new().into_uuid())
            .bind(TierUuid::new().into_uuid())
            .bind(TierUuid::new().into_uuid())
            .execute(pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Insert or update a venue's config for a tier, addressed by tier slug.
    /// Affects zero rows when the slug is unknown.
    pub(crate) async fn upsert_venue_tier(
        &self,
        pool: &PgPool,
        venue: VenueUuid,
        config: &NewVenueTierConfig,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPSERT_VENUE_TIER_SQL)
            .bind(uuid::Uuid::now_v7())
            .bind(venue.into_uuid())
            .bind(&config.tier_slug)
            .bind(config.visits_required)
            .bind(config.window_days)
            .bind(config.wet_discount)
            .bind(config.dry_discount)
            .execute(pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn upsert_staff_rates(
        &self,
        pool: &PgPool,
        venue: VenueUuid,
        rates: StaffRates,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_STAFF_RATES_SQL)
            .bind(uuid::Uuid::now_v7())
            .bind(venue.into_uuid())
            .bind(rates.wet_discount)
            .bind(rates.dry_discount)
            .execute(pool)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for VenueTierConfig {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            tier_uuid: TierUuid::from_uuid(row.try_get("tier_uuid")?),
            tier_name: row.try_get("tier_name")?,
            rank: row.try_get("rank")?,
            visits_required: i64::from(row.try_get::<i32, _>("visits_required")?),
            window_days: row.try_get("window_days")?,
            wet_discount: row.try_get("wet_discount")?,
            dry_discount: row.try_get("dry_discount")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StaffRates {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            wet_discount: row.try_get("wet_discount")?,
            dry_discount: row.try_get("dry_discount")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TierRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TierUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            rank: row.try_get("rank")?,
        })
    }
}
