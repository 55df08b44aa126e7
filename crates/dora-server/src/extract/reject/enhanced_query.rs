use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::TRACING_TARGET;
use crate::handler::{Error, ErrorKind};

/// Enhanced query parameter extractor with improved error handling.
///
/// Query strings that cannot be deserialized (a non-numeric `limit`, a
/// repeated parameter) are reported as `bad_request` naming the parameter
/// where it can be recovered from the deserializer message.
///
/// ```rust,no_run
/// use dora_server::extract::Query;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Params {
///     repository: Option<String>,
///     limit: Option<i64>,
/// }
///
/// async fn list(Query(params): Query<Params>) {
///     let _ = (params.repository, params.limit);
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Creates a new [`Query`] wrapper around the provided query parameters.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes the wrapper and returns the inner query parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(enhance_query_error(rejection)),
        }
    }
}

/// Converts an axum query rejection into a `bad_request` error.
fn enhance_query_error(rejection: QueryRejection) -> Error<'static> {
    tracing::debug!(
        target: TRACING_TARGET,
        error = %rejection,
        "query parameters rejected"
    );

    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => {
            let error_message = err.to_string();
            let field_name = extract_field_name_from_error(&error_message).map(str::to_owned);

            let message = if error_message.contains("invalid") {
                "Invalid query parameter type"
            } else if error_message.contains("duplicate field") {
                "Duplicate query parameter"
            } else {
                "Invalid query parameters"
            };

            let error = ErrorKind::BadRequest
                .with_message(message)
                .with_context(error_message);

            match field_name {
                Some(field) => error.with_resource(field),
                None => error,
            }
        }
        _ => ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context("The query string could not be parsed"),
    }
}

/// Attempts to extract the field name from a serde error message.
fn extract_field_name_from_error(error_message: &str) -> Option<&str> {
    if let Some(start) = error_message.find('`')
        && let Some(end) = error_message[start + 1..].find('`')
    {
        return Some(&error_message[start + 1..start + 1 + end]);
    }

    if let Some(start) = error_message.find("field ") {
        let field_part = &error_message[start + 6..];
        if let Some(end) = field_part.find(' ') {
            return Some(&field_part[..end]);
        }
    }

    None
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumQuery::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumQuery::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_field_names() {
        assert_eq!(
            extract_field_name_from_error("duplicate field `limit`"),
            Some("limit")
        );
        assert_eq!(
            extract_field_name_from_error("duplicate field limit at line 1"),
            Some("limit")
        );
        assert_eq!(extract_field_name_from_error("some other error"), None);
    }

    #[test]
    fn query_wrapper() {
        let query = Query::new("repository".to_string());
        assert_eq!(query.into_inner(), "repository");
    }
}
