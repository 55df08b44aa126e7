//! Filtering options for deployment event queries.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::DeploymentEvent;
use crate::types::DeploymentStatus;

/// Filter options for deployment events.
///
/// The time range is half-open: `from` is inclusive, `to` is exclusive, and
/// both bound `deployment_timestamp`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeploymentFilter {
    /// Inclusive lower bound on the deployment timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    /// Exclusive upper bound on the deployment timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Timestamp>,
    /// Restrict to a single `owner/name` repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Restrict to a single project key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    /// Restrict to a single outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
}

impl DeploymentFilter {
    /// Creates a new empty filter.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to the half-open window `[from, to)`.
    #[inline]
    pub fn with_window(mut self, from: Timestamp, to: Timestamp) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Filters by repository.
    #[inline]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Filters by project key.
    #[inline]
    pub fn with_project_key(mut self, project_key: impl Into<String>) -> Self {
        self.project_key = Some(project_key.into());
        self
    }

    /// Filters by status.
    #[inline]
    pub fn with_status(mut self, status: DeploymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns whether any filter is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.repository.is_none()
            && self.project_key.is_none()
            && self.status.is_none()
    }

    /// Evaluates the filter against an already loaded event.
    ///
    /// Mirrors the `WHERE` clause built by the repository so that in-memory
    /// stores select exactly the same rows.
    pub fn matches(&self, event: &DeploymentEvent) -> bool {
        let deployed_at = event.deployed_at();

        self.from.is_none_or(|from| deployed_at >= from)
            && self.to.is_none_or(|to| deployed_at < to)
            && self
                .repository
                .as_deref()
                .is_none_or(|r| event.repository == r)
            && self
                .project_key
                .as_deref()
                .is_none_or(|p| event.project_key == p)
            && self.status.is_none_or(|s| event.status == s)
    }
}
