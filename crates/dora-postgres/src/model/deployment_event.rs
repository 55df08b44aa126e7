//! Deployment event model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::deployment_events;
use crate::types::{Cursor, DeploymentStatus};

/// A persisted deployment event.
///
/// Rows are immutable once written. Timestamps are stored as instants; the
/// UTC offset submitted by the producer is not retained.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = deployment_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeploymentEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Key of the project the deployment belongs to.
    pub project_key: String,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Branch that was deployed.
    pub branch: String,
    /// Deployed commit (40 hex characters expected, not enforced).
    pub commit_sha: String,
    /// Optional CI workflow run identifier.
    pub workflow_run: Option<String>,
    /// Outcome of the deployment.
    pub status: DeploymentStatus,
    /// When the deployed commit was authored.
    pub commit_timestamp: Timestamp,
    /// When the deployment happened.
    pub deployment_timestamp: Timestamp,
    /// Producer-supplied lead time in seconds.
    pub lead_time_seconds: i64,
    /// When the event was persisted.
    pub created_at: Timestamp,
}

/// Data for appending a new deployment event.
///
/// The identifier and creation time are assigned by the caller before the
/// insert so that every store backend persists the same values.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = deployment_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDeploymentEvent {
    pub id: Uuid,
    pub project_key: String,
    pub repository: String,
    pub branch: String,
    pub commit_sha: String,
    pub workflow_run: Option<String>,
    pub status: DeploymentStatus,
    pub commit_timestamp: Timestamp,
    pub deployment_timestamp: Timestamp,
    pub lead_time_seconds: i64,
    pub created_at: Timestamp,
}

impl DeploymentEvent {
    /// Returns the deployment timestamp.
    #[inline]
    pub fn deployed_at(&self) -> jiff::Timestamp {
        self.deployment_timestamp.into()
    }

    /// Returns the commit timestamp.
    #[inline]
    pub fn committed_at(&self) -> jiff::Timestamp {
        self.commit_timestamp.into()
    }

    /// Returns the persistence timestamp.
    #[inline]
    pub fn recorded_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }

    /// Returns the aggregation ordering key.
    #[inline]
    pub fn order_key(&self) -> (jiff::Timestamp, jiff::Timestamp, Uuid) {
        (self.deployed_at(), self.recorded_at(), self.id)
    }

    /// Returns a cursor positioned at this event.
    #[inline]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.deployed_at(), self.recorded_at(), self.id)
    }

    /// Returns whether the deployment succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns whether the deployment failed.
    #[inline]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Returns the difference between the two timestamps in whole seconds.
    pub fn observed_lead_time_seconds(&self) -> i64 {
        self.deployed_at().as_second() - self.committed_at().as_second()
    }
}

impl From<NewDeploymentEvent> for DeploymentEvent {
    fn from(event: NewDeploymentEvent) -> Self {
        Self {
            id: event.id,
            project_key: event.project_key,
            repository: event.repository,
            branch: event.branch,
            commit_sha: event.commit_sha,
            workflow_run: event.workflow_run,
            status: event.status,
            commit_timestamp: event.commit_timestamp,
            deployment_timestamp: event.deployment_timestamp,
            lead_time_seconds: event.lead_time_seconds,
            created_at: event.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> Timestamp {
        jiff::Timestamp::from_second(seconds).unwrap().into()
    }

    fn new_event(status: DeploymentStatus) -> NewDeploymentEvent {
        NewDeploymentEvent {
            id: Uuid::now_v7(),
            project_key: "proj".into(),
            repository: "org/repo".into(),
            branch: "master".into(),
            commit_sha: "a".repeat(40),
            workflow_run: None,
            status,
            commit_timestamp: ts(1_000),
            deployment_timestamp: ts(1_253),
            lead_time_seconds: 253,
            created_at: ts(1_300),
        }
    }

    #[test]
    fn converts_new_event_without_losing_fields() {
        let new = new_event(DeploymentStatus::Success);
        let event = DeploymentEvent::from(new.clone());

        assert_eq!(event.id, new.id);
        assert_eq!(event.commit_sha, new.commit_sha);
        assert_eq!(event.deployed_at(), jiff::Timestamp::from(new.deployment_timestamp));
        assert!(event.is_success());
        assert!(!event.is_failure());
    }

    #[test]
    fn observed_lead_time_uses_timestamps() {
        let event = DeploymentEvent::from(new_event(DeploymentStatus::Failure));
        assert_eq!(event.observed_lead_time_seconds(), 253);
    }

    #[test]
    fn cursor_matches_order_key() {
        let event = DeploymentEvent::from(new_event(DeploymentStatus::Success));
        assert_eq!(event.cursor().key(), event.order_key());
    }
}
