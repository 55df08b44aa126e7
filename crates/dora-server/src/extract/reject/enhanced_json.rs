//! Enhanced JSON extractor with improved error handling.
//!
//! This module provides [`Json`], an enhanced version of [`axum::Json`] whose
//! rejections become `invalid_payload` errors naming the offending field
//! where one can be recovered.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

/// Maximum allowed JSON payload size in bytes (1MB).
pub const MAX_JSON_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Prefix axum puts in front of the serde error of a data rejection.
const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Enhanced JSON extractor with improved error handling.
///
/// Wrong JSON types, syntax errors, a missing `Content-Type` and oversized
/// bodies are all reported as `invalid_payload`, so the body is rejected
/// before any field-level validation runs.
///
/// [`Json`]: AxumJson
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Creates a new [`Json`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self::new(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            error = %rejection,
            "JSON body rejected"
        );

        match rejection {
            JsonRejection::JsonDataError(err) => {
                let body_text = err.body_text();
                let error = ErrorKind::InvalidPayload
                    .with_message("Field has the wrong type")
                    .with_context(sanitize_error_message(&body_text));

                match extract_field_path(&body_text) {
                    Some(field) => error.with_resource(field.to_owned()),
                    None => error,
                }
            }
            JsonRejection::JsonSyntaxError(err) => ErrorKind::InvalidPayload
                .with_message("Invalid JSON syntax in request body")
                .with_context(sanitize_error_message(&err.body_text())),
            JsonRejection::MissingJsonContentType(_) => ErrorKind::InvalidPayload
                .with_message("Invalid content type")
                .with_suggestion("Set the Content-Type header to 'application/json'"),
            JsonRejection::BytesRejection(err) => {
                let message = err.to_string();
                if message.contains("length limit") {
                    ErrorKind::InvalidPayload
                        .with_message("Request body too large")
                        .with_context(format!(
                            "Request body exceeds the maximum of {MAX_JSON_PAYLOAD_SIZE} bytes"
                        ))
                } else {
                    ErrorKind::InvalidPayload
                        .with_message("Failed to read request body")
                        .with_context(sanitize_error_message(&message))
                }
            }
            _ => ErrorKind::InternalServerError
                .with_message("Request processing failed")
                .with_context("Unexpected error while reading the JSON body"),
        }
    }
}

/// Recovers the field path from a data rejection, e.g. `leadTimeSeconds`
/// out of `...: leadTimeSeconds: invalid type: string "x", expected i64`.
fn extract_field_path(body_text: &str) -> Option<&str> {
    let detail = body_text.strip_prefix(DATA_ERROR_PREFIX)?;
    let (path, _) = detail.split_once(": ")?;

    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));

    is_path.then_some(path)
}

/// Sanitizes error messages to prevent information leakage while keeping them useful.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}

impl<T> aide::OperationInput for Json<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        axum::Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        axum::Json::<T>::inferred_early_responses(ctx, operation)
    }
}

impl<T> aide::OperationOutput for Json<T>
where
    T: schemars::JsonSchema + Serialize,
{
    type Inner = T;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        AxumJson::<T>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumJson::<T>::inferred_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_from_data_error() {
        let text = format!(
            "{DATA_ERROR_PREFIX}leadTimeSeconds: invalid type: string \"x\", expected i64 at line 1 column 20"
        );
        assert_eq!(extract_field_path(&text), Some("leadTimeSeconds"));
    }

    #[test]
    fn no_field_path_for_root_errors() {
        let text = format!("{DATA_ERROR_PREFIX}invalid type: sequence, expected a map");
        assert_eq!(extract_field_path(&text), None);
        assert_eq!(extract_field_path("something else"), None);
    }

    #[test]
    fn sanitizes_long_messages() {
        let message = "x".repeat(500);
        assert_eq!(sanitize_error_message(&message).len(), 200);
    }
}
