//! Promos service.

use async_trait::async_trait;
use jiff::{Timestamp, Zoned};
use mockall::automock;
use rustc_hash::FxHashSet;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        customers::records::CustomerUuid,
        promos::{
            checks::{self, EvaluationContext, UsageCounts},
            data::NewPromo,
            errors::{PromoRejection, PromosServiceError},
            records::{
                AppliedPromo, BestBonus, LOYALTY_BONUS_KIND, PROMO_CODE_KIND,
                PromoAssignmentUuid, PromoKind, PromoRecord, PromoSummary, PromoUsageUuid,
            },
            repository::PgPromosRepository,
        },
        tiers::records::DiscountType,
        transactions::records::TransactionUuid,
        venues::records::VenueUuid,
    },
};

/// A candidate promo with how it reached the customer.
struct Candidate {
    promo: PromoRecord,
    targeted: bool,
    assigned_expires_at: Option<Timestamp>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone)]
pub struct PgPromosService {
    db: Db,
    repository: PgPromosRepository,

    /// When set, usage recording locks the promo row and re-checks limits
    /// inside the same transaction, turning the best-effort limit into a
    /// hard one.
    strict_usage: bool,
}

impl PgPromosService {
    #[must_use]
    pub fn new(db: Db, strict_usage: bool) -> Self {
        Self {
            db,
            repository: PgPromosRepository::new(),
            strict_usage,
        }
    }

    async fn lookup(&self, code: &str) -> Result<PromoRecord, PromosServiceError> {
        self.repository
            .find_by_code(self.db.pool(), &normalize_code(code))
            .await?
            .ok_or(PromosServiceError::Rejected(PromoRejection::UnknownCode))
    }

    /// Prior-use counts, fetched only for the limits actually configured.
    async fn usage_counts(
        &self,
        promo: &PromoRecord,
        customer: Option<CustomerUuid>,
    ) -> Result<UsageCounts, sqlx::Error> {
        let pool = self.db.pool();

        let total = if promo.max_uses.is_some() {
            self.repository.count_uses(pool, promo.uuid).await?
        } else {
            0
        };

        let by_customer = match (promo.max_uses_per_customer, customer) {
            (Some(_), Some(customer)) => {
                self.repository
                    .count_uses_for_customer(pool, promo.uuid, customer)
                    .await?
            }
            _ => 0,
        };

        Ok(UsageCounts { total, by_customer })
    }

    /// General promos for the venue followed by the customer's targeted
    /// ones, deduplicated by promo id with the first occurrence winning.
    async fn candidates(
        &self,
        kind: &str,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
        now: Timestamp,
    ) -> Result<Vec<Candidate>, sqlx::Error> {
        let pool = self.db.pool();

        let mut seen = FxHashSet::default();
        let mut candidates = Vec::new();

        for promo in self.repository.list_general(pool, kind, venue).await? {
            if seen.insert(promo.uuid) {
                candidates.push(Candidate {
                    promo,
                    targeted: false,
                    assigned_expires_at: None,
                });
            }
        }

        if let Some(customer) = customer {
            for targeted in self
                .repository
                .list_targeted(pool, kind, customer, venue, now)
                .await?
            {
                if seen.insert(targeted.promo.uuid) {
                    candidates.push(Candidate {
                        promo: targeted.promo,
                        targeted: true,
                        assigned_expires_at: targeted.assigned_expires_at,
                    });
                }
            }
        }

        Ok(candidates)
    }

    async fn record_usage_strict(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        transaction: TransactionUuid,
        discount_amount: i64,
    ) -> Result<bool, PromosServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(promo) = self
            .repository
            .find_by_code_for_update(&mut tx, &normalize_code(code))
            .await?
        else {
            return Ok(false);
        };

        let total = if promo.max_uses.is_some() {
            self.repository.count_uses(&mut *tx, promo.uuid).await?
        } else {
            0
        };

        let by_customer = match (promo.max_uses_per_customer, customer) {
            (Some(_), Some(customer)) => {
                self.repository
                    .count_uses_for_customer(&mut *tx, promo.uuid, customer)
                    .await?
            }
            _ => 0,
        };

        checks::check_usage(&promo, UsageCounts { total, by_customer })?;

        self.repository
            .insert_usage(
                &mut *tx,
                PromoUsageUuid::new(),
                promo.uuid,
                customer,
                transaction,
                discount_amount,
            )
            .await?;

        tx.commit().await?;

        Ok(true)
    }
}

#[async_trait]
impl PromosService for PgPromosService {
    #[tracing::instrument(
        name = "promos.service.list_available",
        skip(self),
        fields(venue_uuid = %venue),
        err
    )]
    async fn list_available(
        &self,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
    ) -> Result<Vec<PromoSummary>, PromosServiceError> {
        let ctx = EvaluationContext {
            venue,
            customer_known: customer.is_some(),
            now: Zoned::now(),
            total_amount: None,
        };

        // Only promo_code promos are ever offered; loyalty bonuses apply
        // automatically and are surfaced through best_customer_bonus.
        let candidates = self
            .candidates(PROMO_CODE_KIND, customer, venue, ctx.now.timestamp())
            .await?;

        let mut available = Vec::new();

        for candidate in candidates {
            let usage = self.usage_counts(&candidate.promo, customer).await?;

            if checks::check_restrictions(&candidate.promo, &ctx, usage).is_ok() {
                available.push(PromoSummary::from_parts(
                    &candidate.promo,
                    candidate.targeted,
                    candidate.assigned_expires_at,
                ));
            }
        }

        Ok(available)
    }

    async fn validate(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
        total_amount: Option<i64>,
    ) -> Result<PromoSummary, PromosServiceError> {
        let promo = self.lookup(code).await?;

        let ctx = EvaluationContext {
            venue,
            customer_known: customer.is_some(),
            now: Zoned::now(),
            total_amount,
        };

        let usage = self.usage_counts(&promo, customer).await?;

        checks::check_restrictions(&promo, &ctx, usage)?;

        Ok(PromoSummary::from_parts(&promo, false, None))
    }

    #[tracing::instrument(
        name = "promos.service.apply",
        skip(self),
        fields(venue_uuid = %venue),
        err
    )]
    async fn apply(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
        base_wet: f64,
        base_dry: f64,
    ) -> Result<AppliedPromo, PromosServiceError> {
        let promo = self.lookup(code).await?;

        // Same checks as validate, minus min-spend: apply happens before the
        // ticket total is final.
        let ctx = EvaluationContext {
            venue,
            customer_known: customer.is_some(),
            now: Zoned::now(),
            total_amount: None,
        };

        let usage = self.usage_counts(&promo, customer).await?;

        checks::check_restrictions(&promo, &ctx, usage)?;

        match &promo.kind {
            PromoKind::LoyaltyBonus {
                multiplier,
                add_wet,
                add_dry,
            } => {
                if base_wet <= 0.0 && base_dry <= 0.0 {
                    return Err(PromoRejection::NoBaseDiscount.into());
                }

                let (wet_discount, dry_discount) =
                    checks::boosted_rates(*multiplier, *add_wet, *add_dry, base_wet, base_dry);

                Ok(AppliedPromo {
                    code: promo.code,
                    name: promo.name,
                    // A bonus inflates the percentage without reclassifying
                    // the discount.
                    discount_type: DiscountType::Discount,
                    wet_discount,
                    dry_discount,
                })
            }
            PromoKind::PromoCode {
                wet_discount,
                dry_discount,
            } => Ok(AppliedPromo {
                code: promo.code.clone(),
                name: promo.name.clone(),
                discount_type: DiscountType::Promo,
                wet_discount: *wet_discount,
                dry_discount: *dry_discount,
            }),
        }
    }

    async fn best_customer_bonus(
        &self,
        customer: CustomerUuid,
        venue: VenueUuid,
        base_wet: f64,
        base_dry: f64,
    ) -> Result<Option<BestBonus>, PromosServiceError> {
        // A bonus needs something to boost.
        if base_wet <= 0.0 && base_dry <= 0.0 {
            return Ok(None);
        }

        let ctx = EvaluationContext {
            venue,
            customer_known: true,
            now: Zoned::now(),
            total_amount: None,
        };

        let candidates = self
            .candidates(LOYALTY_BONUS_KIND, Some(customer), venue, ctx.now.timestamp())
            .await?;

        let mut best: Option<BestBonus> = None;
        let mut best_total = 0.0_f64;

        for candidate in candidates {
            let usage = self.usage_counts(&candidate.promo, Some(customer)).await?;

            if checks::check_restrictions(&candidate.promo, &ctx, usage).is_err() {
                continue;
            }

            let PromoKind::LoyaltyBonus {
                multiplier,
                add_wet,
                add_dry,
            } = &candidate.promo.kind
            else {
                continue;
            };

            let (wet_discount, dry_discount) =
                checks::boosted_rates(*multiplier, *add_wet, *add_dry, base_wet, base_dry);

            // Strictly greater, so ties go to evaluation order.
            if wet_discount + dry_discount > best_total {
                best_total = wet_discount + dry_discount;
                best = Some(BestBonus {
                    promo: PromoSummary::from_parts(
                        &candidate.promo,
                        candidate.targeted,
                        candidate.assigned_expires_at,
                    ),
                    wet_discount,
                    dry_discount,
                });
            }
        }

        Ok(best)
    }

    async fn record_usage(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        transaction: TransactionUuid,
        discount_amount: i64,
    ) -> Result<bool, PromosServiceError> {
        if self.strict_usage {
            return self
                .record_usage_strict(code, customer, transaction, discount_amount)
                .await;
        }

        let pool = self.db.pool();

        let Some(promo) = self
            .repository
            .find_by_code(pool, &normalize_code(code))
            .await?
        else {
            return Ok(false);
        };

        self.repository
            .insert_usage(
                pool,
                PromoUsageUuid::new(),
                promo.uuid,
                customer,
                transaction,
                discount_amount,
            )
            .await?;

        Ok(true)
    }

    #[tracing::instrument(name = "promos.service.create_promo", skip(self, promo), err)]
    async fn create_promo(&self, promo: NewPromo) -> Result<PromoRecord, PromosServiceError> {
        if promo.name.trim().is_empty() {
            return Err(PromosServiceError::MissingRequiredData);
        }

        let mut promo = promo;
        promo.code = normalize_code(&promo.code);

        if promo.code.is_empty() {
            return Err(PromosServiceError::MissingRequiredData);
        }

        match &promo.kind {
            PromoKind::LoyaltyBonus {
                multiplier,
                add_wet,
                add_dry,
            } => {
                // Bonuses only make sense for identified members; rejected
                // here rather than silently mishandled at evaluation time.
                if !promo.requires_membership {
                    return Err(PromosServiceError::BonusWithoutMembership);
                }

                if multiplier.is_some_and(|multiplier| multiplier <= 0.0)
                    || !(0.0..=100.0).contains(add_wet)
                    || !(0.0..=100.0).contains(add_dry)
                {
                    return Err(PromosServiceError::InvalidData);
                }
            }
            PromoKind::PromoCode {
                wet_discount,
                dry_discount,
            } => {
                if !(0.0..=100.0).contains(wet_discount) || !(0.0..=100.0).contains(dry_discount) {
                    return Err(PromosServiceError::InvalidData);
                }
            }
        }

        if promo.min_spend.is_some_and(|min_spend| min_spend < 0) {
            return Err(PromosServiceError::InvalidData);
        }

        let record = self.repository.create_promo(self.db.pool(), &promo).await?;

        info!(promo_uuid = %record.uuid, code = %record.code, "created promo");

        Ok(record)
    }

    async fn assign_promo(
        &self,
        customer: CustomerUuid,
        code: &str,
        expires_at: Option<Timestamp>,
    ) -> Result<(), PromosServiceError> {
        let promo = self
            .repository
            .find_by_code(self.db.pool(), &normalize_code(code))
            .await?
            .ok_or(PromosServiceError::NotFound)?;

        self.repository
            .assign(
                self.db.pool(),
                PromoAssignmentUuid::new(),
                customer,
                promo.uuid,
                expires_at,
            )
            .await?;

        info!(promo_uuid = %promo.uuid, customer_uuid = %customer, "assigned targeted promo");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Promo evaluation and redemption tracking.
pub trait PromosService: Send + Sync {
    /// Offerable promo-code promos for a customer (or guest) at a venue.
    async fn list_available(
        &self,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
    ) -> Result<Vec<PromoSummary>, PromosServiceError>;

    /// Check a code against every restriction, short-circuiting on the
    /// first failure. Min-spend is only checked when a total is supplied.
    async fn validate(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
        total_amount: Option<i64>,
    ) -> Result<PromoSummary, PromosServiceError>;

    /// Re-validate and compute the final discount rates for a code.
    async fn apply(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        venue: VenueUuid,
        base_wet: f64,
        base_dry: f64,
    ) -> Result<AppliedPromo, PromosServiceError>;

    /// The valid loyalty bonus giving the largest combined boost, if any.
    async fn best_customer_bonus(
        &self,
        customer: CustomerUuid,
        venue: VenueUuid,
        base_wet: f64,
        base_dry: f64,
    ) -> Result<Option<BestBonus>, PromosServiceError>;

    /// Append one redemption to the usage ledger. Returns false when the
    /// code does not resolve to a promo.
    async fn record_usage(
        &self,
        code: &str,
        customer: Option<CustomerUuid>,
        transaction: TransactionUuid,
        discount_amount: i64,
    ) -> Result<bool, PromosServiceError>;

    /// Create a promo definition.
    async fn create_promo(&self, promo: NewPromo) -> Result<PromoRecord, PromosServiceError>;

    /// Grant a customer targeted visibility into a promo.
    async fn assign_promo(
        &self,
        customer: CustomerUuid,
        code: &str,
        expires_at: Option<Timestamp>,
    ) -> Result<(), PromosServiceError>;
}
