//! Transactions Repository

use sqlx::{PgPool, Postgres, Transaction, query, query_scalar};

use crate::domain::{
    customers::records::CustomerUuid,
    transactions::{
        data::{NewLineItem, NewTransaction},
        records::{CustomerPreferenceUuid, TransactionItemUuid, TransactionUuid},
    },
};

const INSERT_TRANSACTION_SQL: &str = include_str!("sql/insert_transaction.sql");
const INSERT_ITEM_SQL: &str = include_str!("sql/insert_item.sql");
const UPSERT_PREFERENCE_SQL: &str = include_str!("sql/upsert_preference.sql");
const COUNT_RECENT_VISITS_SQL: &str = include_str!("sql/count_recent_visits.sql");
const CUSTOMER_EXISTS_SQL: &str = include_str!("sql/customer_exists.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTransactionsRepository;

impl PgTransactionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn customer_exists(
        &self,
        pool: &PgPool,
        customer: CustomerUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(CUSTOMER_EXISTS_SQL)
            .bind(customer.into_uuid())
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn insert_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: TransactionUuid,
        transaction: &NewTransaction,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_TRANSACTION_SQL)
            .bind(uuid.into_uuid())
            .bind(transaction.customer_uuid.into_uuid())
            .bind(transaction.venue_uuid.into_uuid())
            .bind(transaction.ticket_ref.as_deref())
            .bind(transaction.total_amount)
            .bind(transaction.wet_total)
            .bind(transaction.dry_total)
            .bind(transaction.discount_amount)
            .bind(transaction.discount_type.as_str())
            .bind(transaction.tier_at_visit.as_deref())
            .bind(transaction.promo_code.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn insert_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: TransactionItemUuid,
        transaction: TransactionUuid,
        item: &NewLineItem,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_ITEM_SQL)
            .bind(uuid.into_uuid())
            .bind(transaction.into_uuid())
            .bind(&item.product_name)
            .bind(item.product_group.as_deref())
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.is_wet)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Increment the running purchase counter for a product, creating the
    /// row on first purchase.
    pub(crate) async fn upsert_preference(
        &self,
        pool: &PgPool,
        uuid: CustomerPreferenceUuid,
        customer: CustomerUuid,
        venue: crate::domain::venues::records::VenueUuid,
        item: &NewLineItem,
    ) -> Result<(), sqlx::Error> {
        let count = (item.quantity as i64).max(1);

        query(UPSERT_PREFERENCE_SQL)
            .bind(uuid.into_uuid())
            .bind(customer.into_uuid())
            .bind(venue.into_uuid())
            .bind(&item.product_name)
            .bind(item.product_group.as_deref())
            .bind(count)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Transaction rows for the customer across all venues inside the
    /// rolling window. Each row counts as one visit.
    pub(crate) async fn count_recent_visits(
        &self,
        pool: &PgPool,
        customer: CustomerUuid,
        window_days: i32,
    ) -> Result<i64, sqlx::Error> {
        query_scalar(COUNT_RECENT_VISITS_SQL)
            .bind(customer.into_uuid())
            .bind(window_days)
            .fetch_one(pool)
            .await
    }
}
