//! Service health monitoring handlers.
//!
//! The health check probes the event store; an unreachable store reports
//! the service as unhealthy.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::Json;
use crate::handler::Result;
use crate::handler::response::{MonitorStatus, ServiceStatus};
use crate::service::ServiceState;
use crate::service::store::SharedStore;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "dora_server::handler::monitors";

/// Reports whether the service and its event store are available.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(store): State<SharedStore>,
) -> Result<(StatusCode, Json<MonitorStatus>)> {
    let status = match store.health().await {
        Ok(()) => ServiceStatus::Healthy,
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET,
                backend = store.backend(),
                error = %err,
                "Event store health probe failed"
            );
            ServiceStatus::Unhealthy
        }
    };

    let status_code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        backend = store.backend(),
        status = %status,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    Ok((status_code, Json(MonitorStatus::new(status))))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get health status")
        .description("Probes the event store and reports the service health.")
        .response::<200, Json<MonitorStatus>>()
        .response::<503, Json<MonitorStatus>>()
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}
