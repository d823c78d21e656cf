//! Customer Records

use jiff::Timestamp;

use crate::{domain::venues::records::VenueUuid, uuids::TypedUuid};

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Customer Record
///
/// Customers are shared across venues; `home_venue_uuid` records where they
/// registered and feeds tier resolution. Deletion is a soft transition via
/// `is_active`.
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub uuid: CustomerUuid,
    pub home_venue_uuid: VenueUuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,

    /// App-facing QR credential, at most one per customer.
    pub qr_code: Option<String>,

    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Identifier UUID
pub type IdentifierUuid = TypedUuid<IdentifierRecord>;

/// An RFID credential owned by a customer. A customer may hold several.
#[derive(Debug, Clone)]
pub struct IdentifierRecord {
    pub uuid: IdentifierUuid,
    pub customer_uuid: CustomerUuid,
    pub value: String,
    pub label: Option<String>,
    pub is_active: bool,
}

/// One customer in a sync batch, shaped for terminal-side offline caching.
#[derive(Debug, Clone)]
pub struct SyncCustomer {
    pub uuid: CustomerUuid,
    pub name: String,
    pub qr_code: Option<String>,
    pub rfid_values: Vec<String>,
    pub is_staff: bool,
    pub home_venue_uuid: VenueUuid,
    pub home_venue_name: String,
    pub updated_at: Timestamp,
}

/// Result of an incremental customer sync.
#[derive(Debug, Clone)]
pub struct SyncBatch {
    pub customers: Vec<SyncCustomer>,

    /// Server time to use as the `updated_since` cursor on the next call.
    pub sync_time: Timestamp,
}
