//! Transactions service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        promos::PromosService,
        transactions::{
            data::NewTransaction,
            errors::TransactionsServiceError,
            records::{CustomerPreferenceUuid, TransactionItemUuid, TransactionUuid},
            repository::PgTransactionsRepository,
        },
    },
};

#[derive(Clone)]
pub struct PgTransactionsService {
    db: Db,
    repository: PgTransactionsRepository,
    promos: Arc<dyn PromosService>,
}

impl PgTransactionsService {
    #[must_use]
    pub fn new(db: Db, promos: Arc<dyn PromosService>) -> Self {
        Self {
            db,
            repository: PgTransactionsRepository::new(),
            promos,
        }
    }
}

#[async_trait]
impl TransactionsService for PgTransactionsService {
    #[tracing::instrument(
        name = "transactions.service.record",
        skip(self, transaction),
        fields(
            customer_uuid = %transaction.customer_uuid,
            venue_uuid = %transaction.venue_uuid,
            item_count = transaction.items.len()
        ),
        err
    )]
    async fn record(
        &self,
        transaction: NewTransaction,
    ) -> Result<TransactionUuid, TransactionsServiceError> {
        if transaction.total_amount < 0
            || transaction.wet_total < 0
            || transaction.dry_total < 0
            || transaction.discount_amount < 0
        {
            return Err(TransactionsServiceError::InvalidData);
        }

        let pool = self.db.pool();

        if !self
            .repository
            .customer_exists(pool, transaction.customer_uuid)
            .await?
        {
            return Err(TransactionsServiceError::NotFound);
        }

        let uuid = TransactionUuid::new();

        // The ledger row and its line items stand or fall together; any
        // failure here is fatal to the call.
        let mut tx = self.db.begin().await?;

        self.repository
            .insert_transaction(&mut tx, uuid, &transaction)
            .await?;

        for item in &transaction.items {
            self.repository
                .insert_item(&mut tx, TransactionItemUuid::new(), uuid, item)
                .await?;
        }

        tx.commit().await?;

        // Everything past this point is best-effort analytics and promo
        // bookkeeping; a recorded sale is never rolled back for it.
        for item in &transaction.items {
            if item.product_name.is_empty() {
                continue;
            }

            if let Err(error) = self
                .repository
                .upsert_preference(
                    pool,
                    CustomerPreferenceUuid::new(),
                    transaction.customer_uuid,
                    transaction.venue_uuid,
                    item,
                )
                .await
            {
                warn!(%error, product = %item.product_name, "failed to update preference counter");
            }
        }

        if let Some(code) = transaction.promo_code.as_deref() {
            match self
                .promos
                .record_usage(
                    code,
                    Some(transaction.customer_uuid),
                    uuid,
                    transaction.discount_amount,
                )
                .await
            {
                Ok(true) => {}
                Ok(false) => warn!(code, "promo code on transaction did not resolve"),
                Err(error) => warn!(%error, code, "failed to record promo usage"),
            }
        }

        info!(transaction_uuid = %uuid, "recorded transaction");

        Ok(uuid)
    }
}

#[automock]
#[async_trait]
/// Completed-sale recording.
pub trait TransactionsService: Send + Sync {
    /// Persist one immutable sale row with its line items, then update
    /// preference counters and promo usage best-effort.
    async fn record(
        &self,
        transaction: NewTransaction,
    ) -> Result<TransactionUuid, TransactionsServiceError>;
}
