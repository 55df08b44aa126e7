//! Graceful shutdown signal handling.

use std::future::pending;
use std::time::Duration;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;

use super::TRACING_TARGET_SHUTDOWN;

/// Resolves once SIGTERM (Unix) or SIGINT/Ctrl+C is received.
///
/// `shutdown_timeout` is only reported here; the server enforces it.
pub async fn shutdown_signal(shutdown_timeout: Duration) {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                "Failed to install Ctrl+C handler"
            );
            pending::<()>().await;
        } else {
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                "Received Ctrl+C signal"
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    "Received SIGTERM signal"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %err,
                    "Failed to install SIGTERM handler"
                );
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        timeout_secs = shutdown_timeout.as_secs(),
        "Draining in-flight requests"
    );
}
