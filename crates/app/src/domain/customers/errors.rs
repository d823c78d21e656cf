//! Customers service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomersServiceError {
    #[error("customer not found")]
    NotFound,

    #[error("a customer with this email already exists")]
    DuplicateEmail,

    #[error("this RFID code is already registered")]
    DuplicateRfid,

    #[error("this identifier value is already in use")]
    DuplicateIdentifier,

    #[error("could not generate an unused QR code")]
    QrCodesExhausted,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CustomersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            // The pre-checks produce the field-specific conflict errors; a
            // violation surfacing here lost the check-then-insert race.
            Some(ErrorKind::UniqueViolation) => Self::DuplicateIdentifier,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
