//! Customers Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    customers::{
        data::NewRegistration,
        records::{
            CustomerRecord, CustomerUuid, IdentifierRecord, IdentifierUuid, SyncCustomer,
        },
    },
    venues::records::VenueUuid,
};

const FIND_CUSTOMER_BY_RFID_SQL: &str = include_str!("sql/find_customer_by_rfid.sql");
const FIND_CUSTOMER_BY_QR_SQL: &str = include_str!("sql/find_customer_by_qr.sql");
const FIND_CUSTOMER_BY_EMAIL_SQL: &str = include_str!("sql/find_customer_by_email.sql");
const GET_CUSTOMER_SQL: &str = include_str!("sql/get_customer.sql");
const CREATE_CUSTOMER_SQL: &str = include_str!("sql/create_customer.sql");
const CREATE_IDENTIFIER_SQL: &str = include_str!("sql/create_identifier.sql");
const EMAIL_IN_USE_SQL: &str = include_str!("sql/email_in_use.sql");
const QR_IN_USE_SQL: &str = include_str!("sql/qr_in_use.sql");
const IDENTIFIER_VALUE_IN_USE_SQL: &str = include_str!("sql/identifier_value_in_use.sql");
const DEACTIVATE_CUSTOMER_SQL: &str = include_str!("sql/deactivate_customer.sql");
const DEACTIVATE_IDENTIFIERS_SQL: &str = include_str!("sql/deactivate_identifiers.sql");
const LIST_UPDATED_SINCE_SQL: &str = include_str!("sql/list_updated_since.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCustomersRepository;

impl PgCustomersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_by_rfid(
        &self,
        pool: &PgPool,
        value: &str,
    ) -> Result<Option<CustomerRecord>, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(FIND_CUSTOMER_BY_RFID_SQL)
            .bind(value)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn find_by_qr(
        &self,
        pool: &PgPool,
        value: &str,
    ) -> Result<Option<CustomerRecord>, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(FIND_CUSTOMER_BY_QR_SQL)
            .bind(value)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn find_by_email(
        &self,
        pool: &PgPool,
        value: &str,
    ) -> Result<Option<CustomerRecord>, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(FIND_CUSTOMER_BY_EMAIL_SQL)
            .bind(value)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn get_customer(
        &self,
        pool: &PgPool,
        customer: CustomerUuid,
    ) -> Result<Option<CustomerRecord>, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(GET_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn email_in_use(
        &self,
        pool: &PgPool,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(EMAIL_IN_USE_SQL).bind(email).fetch_one(pool).await
    }

    pub(crate) async fn qr_in_use(&self, pool: &PgPool, qr_code: &str) -> Result<bool, sqlx::Error> {
        query_scalar(QR_IN_USE_SQL).bind(qr_code).fetch_one(pool).await
    }

    /// Whether a value collides with any active identifier, QR code, or
    /// email anywhere in the system.
    pub(crate) async fn identifier_value_in_use(
        &self,
        pool: &PgPool,
        value: &str,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(IDENTIFIER_VALUE_IN_USE_SQL)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn create_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CustomerUuid,
        home_venue: VenueUuid,
        registration: &NewRegistration,
        qr_code: &str,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(CREATE_CUSTOMER_SQL)
            .bind(uuid.into_uuid())
            .bind(home_venue.into_uuid())
            .bind(&registration.name)
            .bind(registration.email.as_deref())
            .bind(registration.phone.as_deref())
            .bind(registration.dob.as_deref())
            .bind(qr_code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_identifier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: IdentifierUuid,
        customer: CustomerUuid,
        value: &str,
        label: Option<&str>,
    ) -> Result<IdentifierRecord, sqlx::Error> {
        query_as::<Postgres, IdentifierRecord>(CREATE_IDENTIFIER_SQL)
            .bind(uuid.into_uuid())
            .bind(customer.into_uuid())
            .bind(value)
            .bind(label)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn deactivate_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn deactivate_identifiers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_IDENTIFIERS_SQL)
            .bind(customer.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_updated_since(
        &self,
        pool: &PgPool,
        updated_since: Option<Timestamp>,
    ) -> Result<Vec<SyncCustomer>, sqlx::Error> {
        query_as::<Postgres, SyncCustomer>(LIST_UPDATED_SINCE_SQL)
            .bind(updated_since.map(SqlxTimestamp::from))
            .fetch_all(pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CustomerUuid::from_uuid(row.try_get("uuid")?),
            home_venue_uuid: VenueUuid::from_uuid(row.try_get("home_venue_uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            dob: row.try_get("dob")?,
            qr_code: row.try_get("qr_code")?,
            is_staff: row.try_get("is_staff")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for IdentifierRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: IdentifierUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            value: row.try_get("value")?,
            label: row.try_get("label")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SyncCustomer {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CustomerUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            qr_code: row.try_get("qr_code")?,
            rfid_values: row.try_get("rfid_values")?,
            is_staff: row.try_get("is_staff")?,
            home_venue_uuid: VenueUuid::from_uuid(row.try_get("home_venue_uuid")?),
            home_venue_name: row.try_get("home_venue_name")?,
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
