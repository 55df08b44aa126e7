//! Metrics query parameters.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::deployments::parse_timestamp;
use crate::handler::{ErrorKind, Result};
use crate::service::metrics::{Granularity, MetricsQuery, MetricsWindow, WindowError};

/// Query parameters of the metrics endpoint.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetMetrics {
    /// Inclusive window start (RFC 3339). Defaults to 30 days before `to`.
    pub from: Option<String>,
    /// Exclusive window end (RFC 3339). Defaults to now.
    pub to: Option<String>,
    /// Restrict to one `owner/name` repository.
    pub repository: Option<String>,
    /// Restrict to one project.
    pub project_key: Option<String>,
    /// Unit of the deployment frequency: `day` (default) or `week`.
    pub granularity: Option<String>,
}

impl GetMetrics {
    /// Resolves the parameters against the current time.
    pub fn into_query(self, now: Timestamp) -> Result<MetricsQuery> {
        let from = self
            .from
            .as_deref()
            .map(|from| parse_timestamp("from", from))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|to| parse_timestamp("to", to))
            .transpose()?;

        let window = MetricsWindow::resolve(from, to, now).map_err(|err| match err {
            WindowError::Empty { .. } => ErrorKind::InvalidTimestamp
                .with_message("Window start must be before its end")
                .with_resource("from")
                .with_context(err.to_string()),
            WindowError::OutOfRange { .. } => ErrorKind::InvalidTimestamp
                .with_message("Window end is out of range")
                .with_resource("to")
                .with_context(err.to_string()),
        })?;

        let granularity = match self.granularity.as_deref().map(str::trim) {
            None | Some("") => Granularity::default(),
            Some(granularity) => granularity.parse::<Granularity>().map_err(|_| {
                ErrorKind::InvalidEnumValue
                    .with_message(format!("Unknown granularity '{granularity}'"))
                    .with_resource("granularity")
                    .with_suggestion("Use 'day' or 'week'")
            })?,
        };

        let query = MetricsQuery::new(window, granularity)
            .with_repository(non_empty(self.repository))
            .with_project_key(non_empty(self.project_key));

        Ok(query)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
