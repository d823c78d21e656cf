//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        customers::{CustomersService, PgCustomersService},
        promos::{PgPromosService, PromosService},
        tiers::{PgTiersService, TiersService},
        transactions::{PgTransactionsService, TransactionsService},
        venues::{PgVenuesService, VenuesService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Behavior toggles resolved from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppConfig {
    /// Lock and recount promo usage before recording a redemption, turning
    /// the best-effort usage limit into a hard guarantee.
    pub strict_promo_usage: bool,
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub venues: Arc<dyn VenuesService>,
    pub tiers: Arc<dyn TiersService>,
    pub customers: Arc<dyn CustomersService>,
    pub promos: Arc<dyn PromosService>,
    pub transactions: Arc<dyn TransactionsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, config: AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(url).await.map_err(AppInitError::Database)?;
        let db = Db::new(pool);

        let promos: Arc<dyn PromosService> =
            Arc::new(PgPromosService::new(db.clone(), config.strict_promo_usage));

        Ok(Self {
            auth: Arc::new(PgAuthService::new(db.clone())),
            venues: Arc::new(PgVenuesService::new(db.clone())),
            tiers: Arc::new(PgTiersService::new(db.clone())),
            customers: Arc::new(PgCustomersService::new(db.clone())),
            promos: Arc::clone(&promos),
            transactions: Arc::new(PgTransactionsService::new(db, promos)),
        })
    }
}
