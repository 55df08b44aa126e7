//! Event store error to HTTP error conversion.

use super::TRACING_TARGET;
use crate::handler::{Error, ErrorKind};
use crate::service::store::StoreError;

impl From<StoreError> for Error<'static> {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Postgres(pg_error) => pg_error.into(),
            StoreError::Unavailable(reason) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    reason = %reason,
                    "event store unavailable"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
