//! Tiers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        customers::{PgCustomersRepository, records::CustomerUuid},
        tiers::{
            data::NewVenueTierConfig,
            errors::TiersServiceError,
            records::{NextTierInfo, StaffRates, TierResult},
            repository::PgTiersRepository,
            resolve,
        },
        transactions::PgTransactionsRepository,
        venues::{PgVenuesRepository, records::VenueUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgTiersService {
    db: Db,
    tiers: PgTiersRepository,
    venues: PgVenuesRepository,
    customers: PgCustomersRepository,
    transactions: PgTransactionsRepository,
}

impl PgTiersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            tiers: PgTiersRepository::new(),
            venues: PgVenuesRepository::new(),
            customers: PgCustomersRepository::new(),
            transactions: PgTransactionsRepository::new(),
        }
    }
}

#[async_trait]
impl TiersService for PgTiersService {
    #[tracing::instrument(
        name = "tiers.service.resolve",
        skip(self),
        fields(customer_uuid = %customer, venue_uuid = %visiting_venue),
        err
    )]
    async fn resolve(
        &self,
        customer: CustomerUuid,
        visiting_venue: VenueUuid,
    ) -> Result<TierResult, TiersServiceError> {
        let pool = self.db.pool();

        let customer = self
            .customers
            .get_customer(pool, customer)
            .await?
            .filter(|customer| customer.is_active)
            .ok_or(TiersServiceError::NotFound)?;

        let home_venue = self.venues.get_venue(pool, customer.home_venue_uuid).await?;

        if customer.is_staff {
            let staff_rates = self.tiers.staff_rates(pool, visiting_venue).await?;

            return Ok(resolve::staff_result(home_venue.name, staff_rates));
        }

        let visiting_configs = self.tiers.list_configs(pool, visiting_venue).await?;

        let home_configs = if customer.home_venue_uuid == visiting_venue {
            visiting_configs.clone()
        } else {
            self.tiers.list_configs(pool, customer.home_venue_uuid).await?
        };

        let window_days = resolve::window_days(&visiting_configs);

        let visits = self
            .transactions
            .count_recent_visits(pool, customer.uuid, window_days)
            .await?;

        let member_tier = self.tiers.member_tier(pool).await?;

        Ok(resolve::member_result(
            home_venue.name,
            &home_configs,
            &visiting_configs,
            member_tier.as_ref(),
            visits,
            window_days,
        ))
    }

    async fn next_tier(
        &self,
        customer: CustomerUuid,
        visiting_venue: VenueUuid,
    ) -> Result<Option<NextTierInfo>, TiersServiceError> {
        let pool = self.db.pool();

        let customer = self
            .customers
            .get_customer(pool, customer)
            .await?
            .filter(|customer| customer.is_active)
            .ok_or(TiersServiceError::NotFound)?;

        if customer.is_staff {
            return Ok(None);
        }

        let configs = self.tiers.list_configs(pool, visiting_venue).await?;
        let window_days = resolve::window_days(&configs);

        let visits = self
            .transactions
            .count_recent_visits(pool, customer.uuid, window_days)
            .await?;

        let member_tier = self.tiers.member_tier(pool).await?;
        let fallback = member_tier.map_or_else(resolve::synthetic_member, |tier| {
            resolve::QualifiedTier {
                name: tier.name,
                rank: tier.rank,
            }
        });

        let current = resolve::best_qualifying(&configs, visits, &fallback);

        Ok(resolve::next_tier(&configs, current.rank, visits))
    }

    async fn seed_tiers(&self) -> Result<u64, TiersServiceError> {
        self.tiers
            .seed_tiers(self.db.pool())
            .await
            .map_err(Into::into)
    }

    async fn configure_venue_tier(
        &self,
        venue: VenueUuid,
        config: NewVenueTierConfig,
    ) -> Result<(), TiersServiceError> {
        if !(0.0..=100.0).contains(&config.wet_discount)
            || !(0.0..=100.0).contains(&config.dry_discount)
            || config.visits_required < 0
            || config.window_days <= 0
        {
            return Err(TiersServiceError::InvalidData);
        }

        let rows_affected = self
            .tiers
            .upsert_venue_tier(self.db.pool(), venue, &config)
            .await?;

        if rows_affected == 0 {
            // Unknown tier slug.
            return Err(TiersServiceError::NotFound);
        }

        Ok(())
    }

    async fn set_staff_rates(
        &self,
        venue: VenueUuid,
        rates: StaffRates,
    ) -> Result<(), TiersServiceError> {
        if !(0.0..=100.0).contains(&rates.wet_discount)
            || !(0.0..=100.0).contains(&rates.dry_discount)
        {
            return Err(TiersServiceError::InvalidData);
        }

        self.tiers
            .upsert_staff_rates(self.db.pool(), venue, rates)
            .await
            .map_err(Into::into)
    }
}

#[automock]
#[async_trait]
/// Tier and discount resolution.
pub trait TiersService: Send + Sync {
    /// Resolve the tier and discount rates for a customer visiting a venue.
    async fn resolve(
        &self,
        customer: CustomerUuid,
        visiting_venue: VenueUuid,
    ) -> Result<TierResult, TiersServiceError>;

    /// The next tier the customer can reach at the venue, if any.
    async fn next_tier(
        &self,
        customer: CustomerUuid,
        visiting_venue: VenueUuid,
    ) -> Result<Option<NextTierInfo>, TiersServiceError>;

    /// Insert the default global tier catalog if not present.
    async fn seed_tiers(&self) -> Result<u64, TiersServiceError>;

    /// Set a venue's threshold and rates for one tier.
    async fn configure_venue_tier(
        &self,
        venue: VenueUuid,
        config: NewVenueTierConfig,
    ) -> Result<(), TiersServiceError>;

    /// Set a venue's staff discount rates.
    async fn set_staff_rates(
        &self,
        venue: VenueUuid,
        rates: StaffRates,
    ) -> Result<(), TiersServiceError>;
}
