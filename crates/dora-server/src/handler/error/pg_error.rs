//! Database error to HTTP error conversion.
//!
//! Constraint violations mean a row slipped past request validation and are
//! reported against the offending field. Every other database failure is
//! logged and answered with a generic internal error.

use dora_postgres::PgError;
use dora_postgres::types::{ConstraintCategory, ConstraintViolation};

use super::TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        let error = match constraint.categorize() {
            ConstraintCategory::Validation => {
                ErrorKind::InvalidPayload.with_message("Field value is out of range")
            }
            ConstraintCategory::Chronological => ErrorKind::InvalidTimestamp
                .with_message("Deployment timestamp must not precede the commit timestamp"),
            ConstraintCategory::Uniqueness => return ErrorKind::InternalServerError.into_error(),
        };

        match constraint.field() {
            Some(field) => error.with_resource(field),
            None => error,
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                if let Some(constraint_name) = error.constraint()
                    && let Some(constraint) = ConstraintViolation::new(constraint_name)
                {
                    tracing::error!(
                        target: TRACING_TARGET,
                        constraint = constraint_name,
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
