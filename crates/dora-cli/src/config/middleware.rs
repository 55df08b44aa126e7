//! Middleware configuration for the HTTP server.
//!
//! Groups the CORS, OpenAPI and recovery settings defined in `dora-server`
//! so they can be set from CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! # Allow one browser origin and shorten the request timeout
//! dora --cors-origins "https://dashboard.example.com" --request-timeout 10
//! ```

use clap::Args;
use dora_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining CORS, OpenAPI, and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Origins allowed to call the API from a browser.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Paths serving the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            cors_origins = ?self.cors.allowed_origins,
            cors_credentials = self.cors.allow_credentials,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            request_timeout_secs = self.recovery.request_timeout,
            "Middleware configuration"
        );
    }
}
