//! HTTP server startup.

use std::future::{IntoFuture, pending};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::lifecycle::serve_with_shutdown;
use super::{ServerError, ServerResult, TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};
use crate::config::ServerConfig;
use crate::server::shutdown_signal;

/// Starts an HTTP server with graceful shutdown.
///
/// In-flight requests get at most the configured shutdown timeout to
/// complete once a termination signal arrives.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    if let Err(validation_error) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %validation_error,
            "Invalid server configuration"
        );

        return Err(ServerError::invalid_config(&validation_error));
    }

    let server_addr = server_config.server_addr();
    let listener = match TcpListener::bind(server_addr).await {
        Ok(listener) => {
            tracing::info!(
                target: TRACING_TARGET_STARTUP,
                addr = %server_addr,
                "Server is ready and listening for connections"
            );
            listener
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_STARTUP,
                addr = %server_addr,
                error = %err,
                "Failed to bind to address"
            );
            return Err(ServerError::bind_error(&server_addr.to_string(), err));
        }
    };

    let shutdown_timeout = server_config.shutdown_timeout();
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

    let graceful = async move {
        shutdown_signal(shutdown_timeout).await;
        let _ = signalled_tx.send(());
    };

    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(shutdown_timeout).await,
            Err(_) => pending::<()>().await,
        }
    };

    serve_with_shutdown(&server_config, || async move {
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .into_future();

        tokio::select! {
            result = server => result,
            () = drain_deadline => {
                tracing::warn!(
                    target: TRACING_TARGET_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Shutdown timeout elapsed, dropping in-flight requests"
                );
                Ok(())
            }
        }
    })
    .await
    .map_err(ServerError::Runtime)
}
