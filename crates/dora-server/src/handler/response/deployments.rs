//! Deployment event response types.

use dora_postgres::model::DeploymentEvent;
use dora_postgres::types::DeploymentStatus;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Page;

/// Message returned when an event has been recorded.
pub const DEPLOYMENT_RECORDED: &str = "Deployment event recorded.";

/// A stored deployment event.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Unique event identifier.
    pub id: Uuid,
    /// Key of the project the deployment belongs to.
    pub project_key: String,
    /// Deployed commit.
    pub commit_sha: String,
    /// When the deployed commit was authored, in UTC.
    pub commit_timestamp: Timestamp,
    /// When the deployment happened, in UTC.
    pub deployment_timestamp: Timestamp,
    /// Outcome of the deployment.
    pub status: DeploymentStatus,
    /// Deployed branch.
    pub branch: String,
    /// Producer-supplied lead time in seconds.
    pub lead_time_seconds: i64,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// CI workflow run identifier, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_run: Option<String>,
    /// When the event was persisted, in UTC.
    pub created_at: Timestamp,
}

impl From<DeploymentEvent> for Deployment {
    fn from(event: DeploymentEvent) -> Self {
        Self {
            id: event.id,
            commit_timestamp: event.committed_at(),
            deployment_timestamp: event.deployed_at(),
            created_at: event.recorded_at(),
            project_key: event.project_key,
            commit_sha: event.commit_sha,
            status: event.status,
            branch: event.branch,
            lead_time_seconds: event.lead_time_seconds,
            repository: event.repository,
            workflow_run: event.workflow_run,
        }
    }
}

/// Acknowledgement of a recorded deployment event.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCreated {
    /// Human readable confirmation.
    pub message: String,
    /// Identifier assigned to the event.
    pub id: Uuid,
}

impl DeploymentCreated {
    /// Creates the acknowledgement for the given event identifier.
    pub fn new(id: Uuid) -> Self {
        Self {
            message: DEPLOYMENT_RECORDED.to_owned(),
            id,
        }
    }
}

/// Paginated list of deployment events.
pub type DeploymentsPage = Page<Deployment>;
