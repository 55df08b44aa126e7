use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

/// Tracing target for error responses.
const TRACING_TARGET: &str = "dora_server::handler::errors";

/// HTTP error response body.
///
/// `name` is the error category, `message` the detail, and `resource` names
/// the request field the error relates to. Internal context is logged and
/// never serialized.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// The error category identifier.
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display.
    pub message: Cow<'a, str>,
    /// The field or resource the error relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Helpful suggestion for resolving the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,

    /// Internal context for debugging (not exposed to client).
    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON).
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_ENUM_VALUE: Self = Self::new(
        "invalid_enum_value",
        "Value is not one of the allowed options.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_PAYLOAD: Self = Self::new(
        "invalid_payload",
        "Request body could not be decoded.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_TIMESTAMP: Self = Self::new(
        "invalid_timestamp",
        "Invalid timestamp.",
        StatusCode::BAD_REQUEST,
    );
    pub const MISSING_FIELD: Self = Self::new(
        "missing_field",
        "Missing required field.",
        StatusCode::BAD_REQUEST,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Missing path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self =
        Self::new("not_found", "Resource not found.", StatusCode::NOT_FOUND);
    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const SERVICE_UNAVAILABLE: Self = Self::new(
        "service_unavailable",
        "Service unavailable.",
        StatusCode::SERVICE_UNAVAILABLE,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            suggestion: None,
            context: None,
            status,
        }
    }

    /// Sets the resource. An existing resource is merged with a `/` separator.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{}/{}", existing, new_resource)),
            None => new_resource,
        });
        self
    }

    /// Appends the given detail to the category message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let new_message = message.into();
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{}. {}", base, new_message));
        self
    }

    /// Attaches context. Existing context is merged with a `; ` separator.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }

    /// Attaches a suggestion. Existing suggestions are merged with a `; ` separator.
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        let new_suggestion = suggestion.into();
        self.suggestion = Some(match self.suggestion {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_suggestion)),
            None => new_suggestion,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                target: TRACING_TARGET,
                status = %self.status,
                name = %self.name,
                message = %self.message,
                context = ?self.context,
                "HTTP error response"
            );
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                status = %self.status,
                name = %self.name,
                message = %self.message,
                resource = ?self.resource,
                context = ?self.context,
                "HTTP error response"
            );
        }

        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_merging_resource() {
        let response = ErrorResponse::NOT_FOUND
            .with_resource("deployment")
            .with_resource("id");

        assert_eq!(response.resource.as_deref(), Some("deployment/id"));
    }

    #[test]
    fn error_response_merging_message() {
        let response = ErrorResponse::MISSING_FIELD.with_message("Field 'branch' is required");

        assert_eq!(
            &response.message,
            "Missing required field. Field 'branch' is required"
        );
    }

    #[test]
    fn error_response_merging_context() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("Insert failed")
            .with_context("pool timed out");

        assert_eq!(
            response.context.as_deref(),
            Some("Insert failed; pool timed out")
        );
    }

    #[test]
    fn error_response_serialization() {
        let response = ErrorResponse::INVALID_TIMESTAMP
            .with_resource("commitTimestamp")
            .with_message("Expected RFC 3339")
            .with_context("parse error")
            .with_suggestion("Use 2025-10-20T14:00:26Z");

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "invalid_timestamp");
        assert_eq!(json["resource"], "commitTimestamp");
        assert!(json.get("suggestion").is_some());
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn server_error_body_is_generic() {
        let json = serde_json::to_value(ErrorResponse::INTERNAL_SERVER_ERROR).unwrap();
        assert_eq!(json["name"], "internal_server_error");
        assert_eq!(json["message"], "Internal server error.");
        assert!(json.get("resource").is_none());
    }
}
