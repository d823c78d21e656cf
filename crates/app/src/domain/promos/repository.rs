//! Promos Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, PgPool, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};

use crate::domain::{
    customers::records::CustomerUuid,
    promos::{
        checks,
        data::NewPromo,
        records::{
            PromoAssignmentUuid, PromoKind, PromoRecord, PromoUsageUuid, PromoUuid, TargetedPromo,
            LOYALTY_BONUS_KIND, PROMO_CODE_KIND,
        },
    },
    transactions::records::TransactionUuid,
    venues::records::VenueUuid,
};

const FIND_PROMO_BY_CODE_SQL: &str = include_str!("sql/find_promo_by_code.sql");
const FIND_PROMO_BY_CODE_FOR_UPDATE_SQL: &str = include_str!("sql/find_promo_by_code_for_update.sql");
const LIST_GENERAL_PROMOS_SQL: &str = include_str!("sql/list_general_promos.sql");
const LIST_TARGETED_PROMOS_SQL: &str = include_str!("sql/list_targeted_promos.sql");
const COUNT_USES_SQL: &str = include_str!("sql/count_uses.sql");
const COUNT_USES_FOR_CUSTOMER_SQL: &str = include_str!("sql/count_uses_for_customer.sql");
const INSERT_USAGE_SQL: &str = include_str!("sql/insert_usage.sql");
const CREATE_PROMO_SQL: &str = include_str!("sql/create_promo.sql");
const ASSIGN_PROMO_SQL: &str = include_str!("sql/assign_promo.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromosRepository;

impl PgPromosRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_by_code(
        &self,
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<PromoRecord>, sqlx::Error> {
        query_as::<Postgres, PromoRecord>(FIND_PROMO_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Same lookup, but locking the promo row for the rest of the
    /// transaction. Used by strict usage recording.
    pub(crate) async fn find_by_code_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<PromoRecord>, sqlx::Error> {
        query_as::<Postgres, PromoRecord>(FIND_PROMO_BY_CODE_FOR_UPDATE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Active promos of a kind scoped to the venue or unscoped. Time, day,
    /// membership, and usage restrictions are evaluated by the caller.
    pub(crate) async fn list_general(
        &self,
        pool: &PgPool,
        kind: &str,
        venue: VenueUuid,
    ) -> Result<Vec<PromoRecord>, sqlx::Error> {
        query_as::<Postgres, PromoRecord>(LIST_GENERAL_PROMOS_SQL)
            .bind(kind)
            .bind(venue.into_uuid())
            .fetch_all(pool)
            .await
    }

    /// Active promos of a kind assigned to the customer with an unexpired
    /// assignment.
    pub(crate) async fn list_targeted(
        &self,
        pool: &PgPool,
        kind: &str,
        customer: CustomerUuid,
        venue: VenueUuid,
        now: Timestamp,
    ) -> Result<Vec<TargetedPromo>, sqlx::Error> {
        query_as::<Postgres, TargetedPromo>(LIST_TARGETED_PROMOS_SQL)
            .bind(kind)
            .bind(customer.into_uuid())
            .bind(venue.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .fetch_all(pool)
            .await
    }

    pub(crate) async fn count_uses<'e>(
        &self,
        executor: impl sqlx::PgExecutor<'e>,
        promo: PromoUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar(COUNT_USES_SQL)
            .bind(promo.into_uuid())
            .fetch_one(executor)
            .await
    }

    pub(crate) async fn count_uses_for_customer<'e>(
        &self,
        executor: impl sqlx::PgExecutor<'e>,
        promo: PromoUuid,
        customer: CustomerUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar(COUNT_USES_FOR_CUSTOMER_SQL)
            .bind(promo.into_uuid())
            .bind(customer.into_uuid())
            .fetch_one(executor)
            .await
    }

    pub(crate) async fn insert_usage<'e>(
        &self,
        executor: impl sqlx::PgExecutor<'e>,
        uuid: PromoUsageUuid,
        promo: PromoUuid,
        customer: Option<CustomerUuid>,
        transaction: TransactionUuid,
        discount_amount: i64,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_USAGE_SQL)
            .bind(uuid.into_uuid())
            .bind(promo.into_uuid())
            .bind(customer.map(CustomerUuid::into_uuid))
            .bind(transaction.into_uuid())
            .bind(discount_amount)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub(crate) async fn create_promo(
        &self,
        pool: &PgPool,
        promo: &NewPromo,
    ) -> Result<PromoRecord, sqlx::Error> {
        let (wet, dry, multiplier, add_wet, add_dry) = match &promo.kind {
            PromoKind::PromoCode {
                wet_discount,
                dry_discount,
            } => (Some(*wet_discount), Some(*dry_discount), None, None, None),
            PromoKind::LoyaltyBonus {
                multiplier,
                add_wet,
                add_dry,
            } => (None, None, *multiplier, Some(*add_wet), Some(*add_dry)),
        };

        let valid_days = if promo.valid_days.is_empty() {
            None
        } else {
            Some(checks::format_valid_days(&promo.valid_days))
        };

        query_as::<Postgres, PromoRecord>(CREATE_PROMO_SQL)
            .bind(promo.uuid.into_uuid())
            .bind(&promo.code)
            .bind(&promo.name)
            .bind(promo.description.as_deref())
            .bind(promo.kind.type_as_str())
            .bind(promo.venue_uuid.map(VenueUuid::into_uuid))
            .bind(wet)
            .bind(dry)
            .bind(multiplier)
            .bind(add_wet)
            .bind(add_dry)
            .bind(promo.min_spend)
            .bind(promo.valid_from.map(SqlxTimestamp::from))
            .bind(promo.valid_until.map(SqlxTimestamp::from))
            .bind(promo.time_start.map(|time| time.to_string()))
            .bind(promo.time_end.map(|time| time.to_string()))
            .bind(valid_days)
            .bind(promo.max_uses)
            .bind(promo.max_uses_per_customer)
            .bind(promo.requires_membership)
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn assign(
        &self,
        pool: &PgPool,
        uuid: PromoAssignmentUuid,
        customer: CustomerUuid,
        promo: PromoUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<(), sqlx::Error> {
        query(ASSIGN_PROMO_SQL)
            .bind(uuid.into_uuid())
            .bind(customer.into_uuid())
            .bind(promo.into_uuid())
            .bind(expires_at.map(SqlxTimestamp::from))
            .execute(pool)
            .await?;

        Ok(())
    }
}

fn decode_error(index: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: message.into(),
    }
}

impl<'r> FromRow<'r, PgRow> for PromoRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind_column: String = row.try_get("kind")?;

        let kind = match kind_column.as_str() {
            LOYALTY_BONUS_KIND => PromoKind::LoyaltyBonus {
                multiplier: row.try_get("bonus_multiplier")?,
                add_wet: row
                    .try_get::<Option<f64>, _>("bonus_add_wet")?
                    .unwrap_or(0.0),
                add_dry: row
                    .try_get::<Option<f64>, _>("bonus_add_dry")?
                    .unwrap_or(0.0),
            },
            PROMO_CODE_KIND => PromoKind::PromoCode {
                wet_discount: row
                    .try_get::<Option<f64>, _>("wet_discount")?
                    .unwrap_or(0.0),
                dry_discount: row
                    .try_get::<Option<f64>, _>("dry_discount")?
                    .unwrap_or(0.0),
            },
            other => {
                return Err(decode_error("kind", format!("unknown promo kind {other}")));
            }
        };

        let time_start = row
            .try_get::<Option<String>, _>("time_start")?
            .map(|value| {
                value
                    .parse::<jiff::civil::Time>()
                    .map_err(|_| decode_error("time_start", format!("bad time {value}")))
            })
            .transpose()?;

        let time_end = row
            .try_get::<Option<String>, _>("time_end")?
            .map(|value| {
                value
                    .parse::<jiff::civil::Time>()
                    .map_err(|_| decode_error("time_end", format!("bad time {value}")))
            })
            .transpose()?;

        let valid_days = match row.try_get::<Option<String>, _>("valid_days")? {
            Some(raw) => checks::parse_valid_days(&raw)
                .map_err(|error| decode_error("valid_days", error.to_string()))?,
            None => smallvec::SmallVec::new(),
        };

        Ok(Self {
            uuid: PromoUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            kind,
            venue_uuid: row
                .try_get::<Option<uuid::Uuid>, _>("venue_uuid")?
                .map(VenueUuid::from_uuid),
            min_spend: row.try_get("min_spend")?,
            valid_from: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_from")?
                .map(SqlxTimestamp::to_jiff),
            valid_until: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_until")?
                .map(SqlxTimestamp::to_jiff),
            time_start,
            time_end,
            valid_days,
            max_uses: row
                .try_get::<Option<i32>, _>("max_uses")?
                .map(i64::from),
            max_uses_per_customer: row
                .try_get::<Option<i32>, _>("max_uses_per_customer")?
                .map(i64::from),
            requires_membership: row.try_get("requires_membership")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TargetedPromo {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            promo: PromoRecord::from_row(row)?,
            assigned_expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("assigned_expires_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
