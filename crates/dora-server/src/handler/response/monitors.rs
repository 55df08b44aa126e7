//! Monitor response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Health of the service and its event store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceStatus {
    /// The store answers its health probe.
    Healthy,
    /// The store does not answer.
    Unhealthy,
}

impl ServiceStatus {
    /// Returns whether the service is healthy.
    #[inline]
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// System monitoring status response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Overall system health status.
    pub status: ServiceStatus,
    /// Application version.
    pub version: String,
}

impl MonitorStatus {
    /// Creates a status report checked now.
    pub fn new(status: ServiceStatus) -> Self {
        Self {
            checked_at: Timestamp::now(),
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self::new(ServiceStatus::Healthy)
    }
}
