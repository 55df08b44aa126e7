//! DORA metrics handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;

use crate::extract::{Json, Query};
use crate::handler::Result;
use crate::handler::request::GetMetrics;
use crate::handler::response::{ErrorResponse, Metrics};
use crate::service::ServiceState;
use crate::service::metrics::MetricsAggregator;

/// Tracing target for metrics operations.
const TRACING_TARGET: &str = "dora_server::handler::metrics";

/// Computes the four DORA metrics over a window.
#[tracing::instrument(skip_all)]
async fn get_metrics(
    State(aggregator): State<MetricsAggregator>,
    Query(request): Query<GetMetrics>,
) -> Result<(StatusCode, Json<Metrics>)> {
    let query = request.into_query(Timestamp::now())?;

    tracing::debug!(
        target: TRACING_TARGET,
        from = %query.window.from(),
        to = %query.window.to(),
        granularity = %query.granularity,
        "Computing DORA metrics"
    );

    let metrics = aggregator.compute(&query).await?;

    tracing::info!(
        target: TRACING_TARGET,
        deployments = metrics.change_failure_rate.total,
        failures = metrics.change_failure_rate.failures,
        "DORA metrics computed",
    );

    let response = Metrics::new(metrics, query.repository, query.project_key);
    Ok((StatusCode::OK, Json(response)))
}

fn get_metrics_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get DORA metrics")
        .description(
            "Computes deployment frequency, lead time for changes, change failure \
            rate and time to restore service over `[from, to)`. Statistics that \
            are undefined for the window are returned as `null`.",
        )
        .response::<200, Json<Metrics>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all metrics routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/dora/metrics", get_with(get_metrics, get_metrics_docs))
        .with_path_items(|item| item.tag("Metrics"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use crate::handler::test::{FailingStore, create_test_server, create_test_server_with_store};

    async fn record(server: &axum_test::TestServer, status: &str, commit: &str, deploy: &str) {
        let body = json!({
            "projectKey": "PRJ",
            "commitSha": "a3f9c2e1b8d74f60a5e2c9b1d3f7e8a4c6b2d0f1",
            "status": status,
            "commitTimestamp": commit,
            "deploymentTimestamp": deploy,
            "branch": "main",
            "leadTimeSeconds": 253,
            "repository": "example-org/example-repo",
        });
        server
            .post("/api/dora/deployment")
            .json(&body)
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn single_successful_deployment() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        record(&server, "success", "2025-01-20T14:30:00Z", "2025-01-20T14:34:13Z").await;

        let response = server
            .get("/api/dora/metrics")
            .add_query_param("from", "2025-01-20T00:00:00Z")
            .add_query_param("to", "2025-01-21T00:00:00Z")
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["deploymentFrequency"]["count"], 1);
        assert_eq!(json["deploymentFrequency"]["rate"], 1.0);
        assert_eq!(json["leadTime"]["medianSeconds"], 253.0);
        assert_eq!(json["changeFailureRate"]["failures"], 0);
        assert_eq!(json["changeFailureRate"]["rate"], 0.0);
        assert!(json["timeToRestore"]["medianSeconds"].is_null());

        Ok(())
    }

    #[tokio::test]
    async fn failure_followed_by_success_restores() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        record(&server, "failure", "2025-01-20T09:00:00Z", "2025-01-20T10:00:00Z").await;
        record(&server, "success", "2025-01-20T10:30:00Z", "2025-01-20T11:00:00Z").await;

        let response = server
            .get("/api/dora/metrics")
            .add_query_param("from", "2025-01-20T00:00:00Z")
            .add_query_param("to", "2025-01-21T00:00:00Z")
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["changeFailureRate"]["total"], 2);
        assert_eq!(json["changeFailureRate"]["rate"], 50.0);
        assert_eq!(json["timeToRestore"]["medianSeconds"], 3600.0);
        assert_eq!(json["timeToRestore"]["resolved"], 1);

        Ok(())
    }

    #[tokio::test]
    async fn empty_window_reports_nulls() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .get("/api/dora/metrics")
            .add_query_param("from", "2025-01-20T00:00:00Z")
            .add_query_param("to", "2025-01-21T00:00:00Z")
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["deploymentFrequency"]["count"], 0);
        assert!(json["leadTime"].is_null());
        assert!(json["changeFailureRate"]["rate"].is_null());

        Ok(())
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .get("/api/dora/metrics")
            .add_query_param("from", "2025-01-21T00:00:00Z")
            .add_query_param("to", "2025-01-21T00:00:00Z")
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["name"], "invalid_timestamp");

        Ok(())
    }

    #[tokio::test]
    async fn unknown_granularity_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .get("/api/dora/metrics")
            .add_query_param("granularity", "fortnight")
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["name"], "invalid_enum_value");

        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() -> anyhow::Result<()> {
        let server = create_test_server_with_store(Arc::new(FailingStore)).await?;

        let response = server.get("/api/dora/metrics").await;
        response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        Ok(())
    }
}
