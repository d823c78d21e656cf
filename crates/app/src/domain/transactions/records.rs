//! Transaction Records

use crate::uuids::TypedUuid;

/// Sale ledger row marker. Rows are append-only and never read back as
/// whole records by the engine; visit counting aggregates over them.
#[derive(Debug, Clone)]
pub struct TransactionRecord {}

/// Transaction UUID
pub type TransactionUuid = TypedUuid<TransactionRecord>;

/// Line item marker for typed uuids.
#[derive(Debug, Clone)]
pub struct TransactionItemRecord {}

/// Transaction Item UUID
pub type TransactionItemUuid = TypedUuid<TransactionItemRecord>;

/// Preference counter marker for typed uuids.
#[derive(Debug, Clone)]
pub struct CustomerPreferenceRecord {}

/// Customer Preference UUID
pub type CustomerPreferenceUuid = TypedUuid<CustomerPreferenceRecord>;
