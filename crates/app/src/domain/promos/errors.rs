//! Promos service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

fn pounds(minor: &i64) -> f64 {
    *minor as f64 / 100.0
}

/// Why a promo cannot be used right now. Messages are surfaced verbatim on
/// terminals, so they are written for the person at the till.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PromoRejection {
    #[error("Promo code not found")]
    UnknownCode,

    #[error("This promo code is no longer active")]
    Inactive,

    #[error("This promo is not valid at this location")]
    WrongVenue,

    #[error("This promo is not yet active")]
    NotYetActive,

    #[error("This promo has expired")]
    Expired,

    #[error("This promo is not valid at this time of day")]
    OutsideHours,

    #[error("This promo is not valid today")]
    WrongDay,

    #[error("This promo requires membership. Please scan your card first.")]
    MembershipRequired,

    #[error("Minimum spend of £{:.2} required", pounds(.min_spend))]
    BelowMinSpend { min_spend: i64 },

    #[error("This promo has reached its usage limit")]
    UsageLimitReached,

    #[error("Loyalty bonus requires an existing tier discount")]
    NoBaseDiscount,
}

#[derive(Debug, Error)]
pub enum PromosServiceError {
    /// A restriction check failed; carries the terminal-facing reason.
    #[error(transparent)]
    Rejected(#[from] PromoRejection),

    #[error("promo already exists")]
    AlreadyExists,

    #[error("promo not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("a loyalty bonus must require membership")]
    BonusWithoutMembership,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromosServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
