use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

/// Enhanced path parameter extractor with improved error handling.
///
/// Malformed parameters (a deployment id that is not a UUID) are reported
/// as `bad_request`, absent ones as `missing_path_param`.
///
/// [`Path`]: AxumPath
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Creates a new instance of [`Path`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner path parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor =
            <AxumPath<T> as FromRequestParts<S>>::from_request_parts(parts, state).await;
        extractor.map(|x| Self(x.0)).map_err(Into::into)
    }
}

impl From<PathRejection> for Error<'static> {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            error = %rejection,
            "path parameters rejected"
        );

        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                let error_message = err.to_string();

                ErrorKind::BadRequest
                    .with_message("Invalid path parameter format")
                    .with_context(sanitize_error_message(&error_message))
                    .with_suggestion(enhance_deserialization_error(&error_message))
            }
            PathRejection::MissingPathParams(err) => ErrorKind::MissingPathParam
                .with_message("Required path parameter missing")
                .with_context(sanitize_error_message(&err.to_string())),
            _ => ErrorKind::InternalServerError
                .with_message("Path processing failed")
                .with_context("Unexpected error during path parameter processing"),
        }
    }
}

/// Returns type-specific guidance for a deserialization failure.
fn enhance_deserialization_error(error_message: &str) -> &'static str {
    let error_lower = error_message.to_lowercase();

    if error_lower.contains("uuid") || error_lower.contains("invalid character") {
        "Identifiers must be UUIDs in the form xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
    } else if error_lower.contains("invalid digit") || error_lower.contains("cannot parse") {
        "Numeric parameters must contain only digits"
    } else {
        "Check that the parameter format matches the expected type"
    }
}

/// Sanitizes error messages to prevent information leakage while keeping them useful.
fn sanitize_error_message(message: &str) -> String {
    message
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(150)
        .collect()
}

impl<T> aide::OperationInput for Path<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumPath::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumPath::<T>::inferred_early_responses(ctx, operation)
    }
}
