//! Customers service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        customers::{
            data::{NewIdentifier, NewRegistration},
            errors::CustomersServiceError,
            qr,
            records::{CustomerRecord, CustomerUuid, IdentifierRecord, IdentifierUuid, SyncBatch},
            repository::PgCustomersRepository,
        },
        venues::records::VenueUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }

    /// Generate a QR value not currently in use, retrying a bounded number
    /// of times. The partial unique index still backs this up at insert.
    async fn unused_qr_code(&self, pool: &PgPool) -> Result<String, CustomersServiceError> {
        for _attempt in 0..qr::MAX_QR_ATTEMPTS {
            let candidate = qr::generate_qr_code();

            if !self.repository.qr_in_use(pool, &candidate).await? {
                return Ok(candidate);
            }
        }

        Err(CustomersServiceError::QrCodesExhausted)
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    async fn resolve_identifier(&self, raw: &str) -> Result<CustomerRecord, CustomersServiceError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(CustomersServiceError::NotFound);
        }

        let pool = self.db.pool();

        // Identifier classes are tried in a fixed order; values are unique
        // system-wide, so this is a precedence choice, not a correctness one.
        if let Some(customer) = self.repository.find_by_rfid(pool, value).await? {
            return Ok(customer);
        }

        if let Some(customer) = self.repository.find_by_qr(pool, value).await? {
            return Ok(customer);
        }

        if let Some(customer) = self.repository.find_by_email(pool, value).await? {
            return Ok(customer);
        }

        Err(CustomersServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "customers.service.register",
        skip(self, registration),
        fields(venue_uuid = %home_venue),
        err
    )]
    async fn register(
        &self,
        home_venue: VenueUuid,
        registration: NewRegistration,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        if registration.name.trim().is_empty() {
            return Err(CustomersServiceError::MissingRequiredData);
        }

        let pool = self.db.pool();

        if let Some(email) = registration.email.as_deref() {
            if self.repository.email_in_use(pool, email).await? {
                return Err(CustomersServiceError::DuplicateEmail);
            }
        }

        if let Some(rfid) = registration.rfid.as_deref() {
            if self.repository.identifier_value_in_use(pool, rfid).await? {
                return Err(CustomersServiceError::DuplicateRfid);
            }
        }

        let qr_code = self.unused_qr_code(pool).await?;

        let mut tx = self.db.begin().await?;

        let customer = self
            .repository
            .create_customer(&mut tx, CustomerUuid::new(), home_venue, &registration, &qr_code)
            .await?;

        if let Some(rfid) = registration.rfid.as_deref() {
            self.repository
                .create_identifier(&mut tx, IdentifierUuid::new(), customer.uuid, rfid, None)
                .await?;
        }

        tx.commit().await?;

        info!(customer_uuid = %customer.uuid, "registered customer");

        Ok(customer)
    }

    #[tracing::instrument(
        name = "customers.service.add_identifier",
        skip(self, identifier),
        fields(customer_uuid = %customer),
        err
    )]
    async fn add_identifier(
        &self,
        customer: CustomerUuid,
        identifier: NewIdentifier,
    ) -> Result<IdentifierRecord, CustomersServiceError> {
        if identifier.value.trim().is_empty() {
            return Err(CustomersServiceError::MissingRequiredData);
        }

        let pool = self.db.pool();

        self.repository
            .get_customer(pool, customer)
            .await?
            .filter(|customer| customer.is_active)
            .ok_or(CustomersServiceError::NotFound)?;

        if self
            .repository
            .identifier_value_in_use(pool, &identifier.value)
            .await?
        {
            return Err(CustomersServiceError::DuplicateIdentifier);
        }

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .create_identifier(
                &mut tx,
                IdentifierUuid::new(),
                customer,
                &identifier.value,
                identifier.label.as_deref(),
            )
            .await?;

        tx.commit().await?;

        info!(identifier_uuid = %record.uuid, "added identifier");

        Ok(record)
    }

    #[tracing::instrument(
        name = "customers.service.deactivate",
        skip(self),
        fields(customer_uuid = %customer),
        err
    )]
    async fn deactivate(&self, customer: CustomerUuid) -> Result<(), CustomersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.deactivate_customer(&mut tx, customer).await?;

        if rows_affected == 0 {
            return Err(CustomersServiceError::NotFound);
        }

        let identifiers = self
            .repository
            .deactivate_identifiers(&mut tx, customer)
            .await?;

        tx.commit().await?;

        info!(identifiers, "deactivated customer and identifiers");

        Ok(())
    }

    async fn sync(
        &self,
        updated_since: Option<Timestamp>,
    ) -> Result<SyncBatch, CustomersServiceError> {
        let customers = self
            .repository
            .list_updated_since(self.db.pool(), updated_since)
            .await?;

        Ok(SyncBatch {
            customers,
            sync_time: Timestamp::now(),
        })
    }
}

#[automock]
#[async_trait]
/// Customer lookup and lifecycle operations.
pub trait CustomersService: Send + Sync {
    /// Map a scanned or typed value to an active customer: RFID identifiers
    /// first, then QR codes, then emails. First exact match wins.
    async fn resolve_identifier(&self, raw: &str) -> Result<CustomerRecord, CustomersServiceError>;

    /// Register a new customer with the calling venue as their home venue.
    async fn register(
        &self,
        home_venue: VenueUuid,
        registration: NewRegistration,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Attach a new RFID credential to an existing customer.
    async fn add_identifier(
        &self,
        customer: CustomerUuid,
        identifier: NewIdentifier,
    ) -> Result<IdentifierRecord, CustomersServiceError>;

    /// Soft-delete a customer and deactivate all their identifiers together.
    async fn deactivate(&self, customer: CustomerUuid) -> Result<(), CustomersServiceError>;

    /// Active customers updated after the cursor, for terminal offline caches.
    async fn sync(
        &self,
        updated_since: Option<Timestamp>,
    ) -> Result<SyncBatch, CustomersServiceError>;
}
