//! DORA metrics response types.
//!
//! Undefined statistics serialize as `null`, never as zero.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::service::metrics::{self, DoraMetrics, Granularity};

/// Deployment frequency over the window.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentFrequency {
    /// Number of successful deployments.
    pub count: u64,
    /// Unit of `rate`.
    pub granularity: Granularity,
    /// Successful deployments per unit.
    pub rate: f64,
}

/// Lead time for changes over successful deployments.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadTime {
    /// Median lead time in seconds.
    pub median_seconds: f64,
    /// Mean lead time in seconds.
    pub mean_seconds: f64,
    /// Number of successful deployments sampled.
    pub count: u64,
}

/// Change failure rate over the window.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFailureRate {
    /// Number of failed deployments.
    pub failures: u64,
    /// Number of deployments.
    pub total: u64,
    /// Percentage of failed deployments, `null` without deployments.
    pub rate: Option<f64>,
}

/// Time to restore service after a failed deployment.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeToRestore {
    /// Median restore time in seconds, `null` without resolved incidents.
    pub median_seconds: Option<f64>,
    /// Mean restore time in seconds, `null` without resolved incidents.
    pub mean_seconds: Option<f64>,
    /// Failures followed by a later success in the same repository.
    pub resolved: u64,
    /// Failures without a later success in the window.
    pub unresolved: u64,
}

/// The four DORA metrics for one window.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Inclusive window start.
    pub from: Timestamp,
    /// Exclusive window end.
    pub to: Timestamp,
    /// Repository filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Project filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    pub deployment_frequency: DeploymentFrequency,
    /// `null` when the window holds no successful deployment.
    pub lead_time: Option<LeadTime>,
    pub change_failure_rate: ChangeFailureRate,
    pub time_to_restore: TimeToRestore,
}

impl Metrics {
    /// Builds the response for computed metrics and the filters that scoped them.
    pub fn new(
        metrics: DoraMetrics,
        repository: Option<String>,
        project_key: Option<String>,
    ) -> Self {
        Self {
            from: metrics.window.from(),
            to: metrics.window.to(),
            repository,
            project_key,
            deployment_frequency: metrics.deployment_frequency.into(),
            lead_time: metrics.lead_time.map(Into::into),
            change_failure_rate: metrics.change_failure_rate.into(),
            time_to_restore: metrics.time_to_restore.into(),
        }
    }
}

impl From<metrics::DeploymentFrequency> for DeploymentFrequency {
    fn from(value: metrics::DeploymentFrequency) -> Self {
        Self {
            count: value.count,
            granularity: value.granularity,
            rate: value.rate,
        }
    }
}

impl From<metrics::LeadTime> for LeadTime {
    fn from(value: metrics::LeadTime) -> Self {
        Self {
            median_seconds: value.median_seconds,
            mean_seconds: value.mean_seconds,
            count: value.count,
        }
    }
}

impl From<metrics::ChangeFailureRate> for ChangeFailureRate {
    fn from(value: metrics::ChangeFailureRate) -> Self {
        Self {
            failures: value.failures,
            total: value.total,
            rate: value.rate,
        }
    }
}

impl From<metrics::TimeToRestore> for TimeToRestore {
    fn from(value: metrics::TimeToRestore) -> Self {
        Self {
            median_seconds: value.median_seconds,
            mean_seconds: value.mean_seconds,
            resolved: value.resolved,
            unresolved: value.unresolved,
        }
    }
}
