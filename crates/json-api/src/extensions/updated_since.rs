//! Sync cursor query parsing helpers.

use jiff::Timestamp;
use salvo::{oapi::extract::QueryParam, prelude::StatusError};

use crate::extensions::*;

pub(crate) trait UpdatedSinceExt {
    fn into_updated_since(self) -> Result<Option<Timestamp>, StatusError>;
}

impl UpdatedSinceExt for QueryParam<String, false> {
    fn into_updated_since(self) -> Result<Option<Timestamp>, StatusError> {
        self.into_inner()
            .map(|value| value.parse::<Timestamp>())
            .transpose()
            .or_400("could not parse \"updated_since\" query parameter")
    }
}
