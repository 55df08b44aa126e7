//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── service: ServiceConfig       # Store backend, Postgres, metrics tuning
//! ├── middleware: MiddlewareConfig # CORS, OpenAPI, recovery/timeouts
//! └── server: ServerConfig         # Host, port, shutdown
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure database and server
//! dora --postgres-url "postgresql://..." --port 8080
//!
//! # Or run against the in-memory store
//! STORE_BACKEND=memory PORT=8080 dora
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use dora_postgres::PgConfig;
use dora_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the DORA metrics server:
/// - [`ServiceConfig`]: Event store backend and metrics settings
/// - [`MiddlewareConfig`]: HTTP middleware (CORS, OpenAPI, recovery)
/// - [`ServerConfig`]: Network binding and shutdown
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "dora")]
#[command(about = "DORA deployment metrics server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Event store and metrics configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Debug builds log human readable lines, release builds log JSON.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let (pretty, json) = if cfg!(debug_assertions) {
            (Some(tracing_subscriber::fmt::layer()), None)
        } else {
            (None, Some(tracing_subscriber::fmt::layer().json()))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(pretty)
            .with(json)
            .init();
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            store = %self.service.store,
            lead_time_tolerance_secs = self.service.lead_time_tolerance_secs,
            metrics_page_size = self.service.aggregation_page_size,
            "Service configuration"
        );

        log_database_config(&self.service.postgres);
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Logs database configuration with the password masked.
fn log_database_config(config: &PgConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        postgres_url = %config.database_url_masked(),
        postgres_max_connections = config.postgres_max_connections,
        postgres_connection_timeout_secs = ?config.postgres_connection_timeout_secs,
        postgres_idle_timeout_secs = ?config.postgres_idle_timeout_secs,
        "Database configuration"
    );
}
