//! Deployment event ingestion and retrieval handlers.
//!
//! Events are validated, stamped with an identifier and a receipt time, and
//! appended to the event store. Stored events are never updated.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use uuid::Uuid;

use crate::extract::{Json, Path, Query};
use crate::handler::request::{CreateDeployment, DeploymentPathParams, ListDeployments};
use crate::handler::response::{
    Deployment, DeploymentCreated, DeploymentsPage, ErrorResponse, Page,
};
use crate::handler::{ErrorKind, Result};
use crate::service::store::SharedStore;
use crate::service::{IngestionPolicy, ServiceState};

/// Tracing target for deployment event operations.
const TRACING_TARGET: &str = "dora_server::handler::deployments";

/// Records a deployment event.
#[tracing::instrument(skip_all)]
async fn create_deployment(
    State(store): State<SharedStore>,
    State(policy): State<IngestionPolicy>,
    Json(request): Json<CreateDeployment>,
) -> Result<(StatusCode, Json<DeploymentCreated>)> {
    tracing::debug!(target: TRACING_TARGET, "Recording deployment event");

    let new_event = request.into_model(Uuid::now_v7(), Timestamp::now())?;
    let event = store.append(new_event).await?;

    if let Some(drift) = policy.lead_time_drift(
        event.committed_at(),
        event.deployed_at(),
        event.lead_time_seconds,
    ) {
        tracing::warn!(
            target: TRACING_TARGET,
            event_id = %event.id,
            lead_time_seconds = event.lead_time_seconds,
            drift_seconds = drift,
            tolerance_seconds = policy.lead_time_tolerance_secs(),
            "Submitted lead time disagrees with the event timestamps"
        );
    }

    tracing::info!(
        target: TRACING_TARGET,
        event_id = %event.id,
        repository = %event.repository,
        status = %event.status,
        "Deployment event recorded",
    );

    Ok((StatusCode::CREATED, Json(DeploymentCreated::new(event.id))))
}

fn create_deployment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Record deployment")
        .description(
            "Validates a deployment event and appends it to the event log. \
            Timestamps are normalized to UTC.",
        )
        .response::<201, Json<DeploymentCreated>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Returns a stored deployment event.
#[tracing::instrument(
    skip_all,
    fields(deployment_id = %path_params.deployment_id)
)]
async fn read_deployment(
    State(store): State<SharedStore>,
    Path(path_params): Path<DeploymentPathParams>,
) -> Result<(StatusCode, Json<Deployment>)> {
    tracing::debug!(target: TRACING_TARGET, "Reading deployment event");

    let Some(event) = store.find(path_params.deployment_id).await? else {
        return Err(ErrorKind::NotFound
            .with_message("Deployment event not found")
            .with_resource("deploymentId"));
    };

    Ok((StatusCode::OK, Json(event.into())))
}

fn read_deployment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get deployment")
        .description("Returns a stored deployment event by its identifier.")
        .response::<200, Json<Deployment>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Lists deployment events in aggregation order.
#[tracing::instrument(skip_all)]
async fn list_deployments(
    State(store): State<SharedStore>,
    Query(request): Query<ListDeployments>,
) -> Result<(StatusCode, Json<DeploymentsPage>)> {
    tracing::debug!(target: TRACING_TARGET, "Listing deployment events");

    let filter = request.filter()?;
    let pagination = request.pagination()?;
    let page = store.list_page(&filter, pagination).await?;

    let page = Page::from_cursor_page(page, Deployment::from);

    tracing::debug!(
        target: TRACING_TARGET,
        event_count = page.items.len(),
        has_more = page.has_more(),
        "Deployment events listed",
    );

    Ok((StatusCode::OK, Json(page)))
}

fn list_deployments_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List deployments")
        .description(
            "Returns deployment events ordered by deployment timestamp. \
            Follow `nextCursor` to fetch further pages.",
        )
        .response::<200, Json<DeploymentsPage>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all deployment event routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/dora/deployment",
            post_with(create_deployment, create_deployment_docs),
        )
        .api_route(
            "/api/dora/deployment/{deploymentId}",
            get_with(read_deployment, read_deployment_docs),
        )
        .api_route(
            "/api/dora/deployments",
            get_with(list_deployments, list_deployments_docs),
        )
        .with_path_items(|item| item.tag("Deployments"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{FailingStore, create_test_server, create_test_server_with_store};
    use crate::service::store::MemoryStore;

    fn payload() -> Value {
        json!({
            "projectKey": "PRJ",
            "commitSha": "a3f9c2e1b8d74f60a5e2c9b1d3f7e8a4c6b2d0f1",
            "status": "success",
            "commitTimestamp": "2025-01-20T14:30:00Z",
            "deploymentTimestamp": "2025-01-20T14:34:13Z",
            "branch": "main",
            "leadTimeSeconds": 253,
            "repository": "example-org/example-repo",
            "workflowRun": "12345"
        })
    }

    #[tokio::test]
    async fn create_then_read_round_trip() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.post("/api/dora/deployment").json(&payload()).await;
        response.assert_status(StatusCode::CREATED);
        let created = response.json::<DeploymentCreated>();
        assert_eq!(created.message, "Deployment event recorded.");

        let response = server
            .get(&format!("/api/dora/deployment/{}", created.id))
            .await;
        response.assert_status_ok();
        let deployment = response.json::<Deployment>();
        assert_eq!(deployment.id, created.id);
        assert_eq!(deployment.project_key, "PRJ");
        assert_eq!(deployment.lead_time_seconds, 253);
        assert_eq!(deployment.workflow_run.as_deref(), Some("12345"));
        assert_eq!(
            deployment.deployment_timestamp,
            "2025-01-20T14:34:13Z".parse::<Timestamp>()?
        );

        Ok(())
    }

    #[tokio::test]
    async fn offsets_are_normalized_to_utc() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let server = create_test_server_with_store(store.clone()).await?;

        let mut body = payload();
        body["commitTimestamp"] = json!("2025-01-20T16:30:00+02:00");
        body["deploymentTimestamp"] = json!("2025-01-20T16:34:13+02:00");
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let created = response.json::<DeploymentCreated>();

        let response = server
            .get(&format!("/api/dora/deployment/{}", created.id))
            .await;
        let json = response.json::<Value>();
        assert_eq!(json["commitTimestamp"], "2025-01-20T14:30:00Z");
        assert_eq!(store.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_status_is_rejected_and_not_stored() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let server = create_test_server_with_store(store.clone()).await?;

        let mut body = payload();
        body["status"] = json!("pending");
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status_bad_request();

        let json = response.json::<Value>();
        assert_eq!(json["name"], "invalid_enum_value");
        assert_eq!(json["resource"], "status");
        assert!(store.is_empty().await);

        Ok(())
    }

    #[tokio::test]
    async fn missing_field_names_the_field() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let mut body = payload();
        body.as_object_mut().map(|object| object.remove("branch"));
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status_bad_request();

        let json = response.json::<Value>();
        assert_eq!(json["name"], "missing_field");
        assert_eq!(json["resource"], "branch");

        Ok(())
    }

    #[tokio::test]
    async fn inverted_timestamps_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let mut body = payload();
        body["deploymentTimestamp"] = json!("2025-01-20T14:00:00Z");
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status_bad_request();

        let json = response.json::<Value>();
        assert_eq!(json["name"], "invalid_timestamp");
        assert_eq!(json["resource"], "deploymentTimestamp");

        Ok(())
    }

    #[tokio::test]
    async fn unparsable_timestamp_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let mut body = payload();
        body["commitTimestamp"] = json!("yesterday");
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status_bad_request();

        let json = response.json::<Value>();
        assert_eq!(json["name"], "invalid_timestamp");
        assert_eq!(json["resource"], "commitTimestamp");

        Ok(())
    }

    #[tokio::test]
    async fn negative_lead_time_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let mut body = payload();
        body["leadTimeSeconds"] = json!(-1);
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status_bad_request();

        let json = response.json::<Value>();
        assert_eq!(json["name"], "invalid_payload");
        assert_eq!(json["resource"], "leadTimeSeconds");

        Ok(())
    }

    #[tokio::test]
    async fn wrong_json_type_is_invalid_payload() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let mut body = payload();
        body["leadTimeSeconds"] = json!("253");
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status_bad_request();

        let json = response.json::<Value>();
        assert_eq!(json["name"], "invalid_payload");

        Ok(())
    }

    #[tokio::test]
    async fn drifting_lead_time_is_accepted_as_supplied() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let mut body = payload();
        body["leadTimeSeconds"] = json!(9_000);
        let response = server.post("/api/dora/deployment").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let created = response.json::<DeploymentCreated>();

        let response = server
            .get(&format!("/api/dora/deployment/{}", created.id))
            .await;
        assert_eq!(response.json::<Deployment>().lead_time_seconds, 9_000);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_deployment_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .get(&format!("/api/dora/deployment/{}", Uuid::now_v7()))
            .await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["name"], "not_found");

        Ok(())
    }

    #[tokio::test]
    async fn malformed_deployment_id_is_bad_request() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/api/dora/deployment/not-a-uuid").await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn list_follows_cursors_in_deployment_order() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        for minute in [30, 10, 20] {
            let mut body = payload();
            body["commitTimestamp"] = json!("2025-01-20T14:00:00Z");
            body["deploymentTimestamp"] = json!(format!("2025-01-20T14:{minute}:00Z"));
            server
                .post("/api/dora/deployment")
                .json(&body)
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/api/dora/deployments")
            .add_query_param("limit", 2)
            .add_query_param("includeCount", true)
            .await;
        response.assert_status_ok();
        let first = response.json::<Page<Deployment>>();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total, Some(3));
        assert!(first.items[0].deployment_timestamp < first.items[1].deployment_timestamp);
        let cursor = first.next_cursor.clone().expect("more pages");

        let response = server
            .get("/api/dora/deployments")
            .add_query_param("limit", 2)
            .add_query_param("cursor", &cursor)
            .await;
        response.assert_status_ok();
        let second = response.json::<Page<Deployment>>();
        assert_eq!(second.items.len(), 1);
        assert!(second.next_cursor.is_none());
        assert!(first.items[1].deployment_timestamp < second.items[0].deployment_timestamp);

        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_status() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        for status in ["success", "failure", "success"] {
            let mut body = payload();
            body["status"] = json!(status);
            server.post("/api/dora/deployment").json(&body).await;
        }

        let response = server
            .get("/api/dora/deployments")
            .add_query_param("status", "failure")
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Page<Deployment>>().items.len(), 1);

        let response = server
            .get("/api/dora/deployments")
            .add_query_param("status", "pending")
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() -> anyhow::Result<()> {
        let server = create_test_server_with_store(Arc::new(FailingStore)).await?;

        let response = server.post("/api/dora/deployment").json(&payload()).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json::<Value>()["name"], "internal_server_error");

        Ok(())
    }
}
