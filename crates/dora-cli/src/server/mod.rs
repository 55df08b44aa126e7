//! HTTP server startup with lifecycle management and graceful shutdown.

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "dora_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "dora_cli::server::shutdown";

mod error;
mod http_server;
mod lifecycle;
mod shutdown;

use axum::Router;

pub use self::error::{ServerError, ServerResult};
use self::http_server::serve_http;
pub(crate) use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;

/// Binds the configured address and serves the router until a shutdown
/// signal is received.
///
/// # Errors
///
/// Returns an error if:
/// - The server configuration is invalid
/// - Cannot bind to the specified address/port
/// - Server encounters a fatal error during operation
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    serve_http(app, config).await
}
