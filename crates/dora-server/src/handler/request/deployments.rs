//! Deployment event request types.

use dora_postgres::model::NewDeploymentEvent;
use dora_postgres::types::{Cursor, CursorPagination, DEFAULT_PAGE_SIZE, DeploymentFilter, DeploymentStatus};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handler::{Error, ErrorKind, Result};

/// Request payload for recording a deployment event.
///
/// Every field is optional at the decoding stage so that an absent or
/// `null` field is reported as `missing_field` naming it, rather than as a
/// generic decoding failure. Wrong JSON types still fail decoding.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeployment {
    /// Key of the project the deployment belongs to.
    pub project_key: Option<String>,
    /// Deployed commit, 40 hex characters expected.
    pub commit_sha: Option<String>,
    /// Outcome of the deployment: `success` or `failure`.
    pub status: Option<String>,
    /// RFC 3339 timestamp with offset of the deployed commit.
    pub commit_timestamp: Option<String>,
    /// RFC 3339 timestamp with offset of the deployment.
    pub deployment_timestamp: Option<String>,
    /// Deployed branch.
    pub branch: Option<String>,
    /// Repository in `owner/name` form.
    pub repository: Option<String>,
    /// Seconds between commit and deployment as measured by the producer.
    pub lead_time_seconds: Option<i64>,
    /// Optional CI workflow run identifier.
    pub workflow_run: Option<String>,
}

impl CreateDeployment {
    /// Validates the payload and converts it into an insertable event.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// required fields, the status value, timestamp syntax, timestamp order
    /// and finally the lead time range.
    pub fn into_model(self, id: Uuid, created_at: Timestamp) -> Result<NewDeploymentEvent> {
        let project_key = required_text("projectKey", self.project_key)?;
        let commit_sha = required_text("commitSha", self.commit_sha)?;
        let status = required_text("status", self.status)?;
        let commit_timestamp = required_text("commitTimestamp", self.commit_timestamp)?;
        let deployment_timestamp = required_text("deploymentTimestamp", self.deployment_timestamp)?;
        let branch = required_text("branch", self.branch)?;
        let repository = required_text("repository", self.repository)?;
        let lead_time_seconds = self
            .lead_time_seconds
            .ok_or_else(|| missing_field("leadTimeSeconds"))?;

        let status = status.parse::<DeploymentStatus>().map_err(|_| {
            ErrorKind::InvalidEnumValue
                .with_message(format!("Unknown deployment status '{status}'"))
                .with_resource("status")
                .with_suggestion("Use 'success' or 'failure'")
        })?;

        let commit_timestamp = parse_timestamp("commitTimestamp", &commit_timestamp)?;
        let deployment_timestamp = parse_timestamp("deploymentTimestamp", &deployment_timestamp)?;

        if deployment_timestamp < commit_timestamp {
            return Err(ErrorKind::InvalidTimestamp
                .with_message("Deployment timestamp must not precede the commit timestamp")
                .with_resource("deploymentTimestamp"));
        }

        if lead_time_seconds < 0 {
            return Err(ErrorKind::InvalidPayload
                .with_message("Lead time must be a non-negative number of seconds")
                .with_resource("leadTimeSeconds"));
        }

        let workflow_run = self.workflow_run.filter(|run| !run.trim().is_empty());

        Ok(NewDeploymentEvent {
            id,
            project_key,
            repository,
            branch,
            commit_sha,
            workflow_run,
            status,
            commit_timestamp: commit_timestamp.into(),
            deployment_timestamp: deployment_timestamp.into(),
            lead_time_seconds,
            created_at: created_at.into(),
        })
    }
}

/// Query parameters for listing deployment events.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDeployments {
    /// Inclusive lower bound on the deployment timestamp (RFC 3339).
    pub from: Option<String>,
    /// Exclusive upper bound on the deployment timestamp (RFC 3339).
    pub to: Option<String>,
    /// Restrict to one `owner/name` repository.
    pub repository: Option<String>,
    /// Restrict to one project.
    pub project_key: Option<String>,
    /// Restrict to one outcome: `success` or `failure`.
    pub status: Option<String>,
    /// Opaque cursor returned as `nextCursor` by the previous page.
    pub cursor: Option<String>,
    /// Page size, clamped to 1..=100. Defaults to 50.
    pub limit: Option<i64>,
    /// Whether to include the total number of matching events.
    pub include_count: Option<bool>,
}

impl ListDeployments {
    /// Builds the store filter, rejecting malformed bounds or status.
    pub fn filter(&self) -> Result<DeploymentFilter> {
        let mut filter = DeploymentFilter::new();

        filter.from = self
            .from
            .as_deref()
            .map(|from| parse_timestamp("from", from))
            .transpose()?;
        filter.to = self
            .to
            .as_deref()
            .map(|to| parse_timestamp("to", to))
            .transpose()?;

        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from >= to
        {
            return Err(ErrorKind::InvalidTimestamp
                .with_message("Window start must be before its end")
                .with_resource("from"));
        }

        if let Some(repository) = non_empty(self.repository.as_deref()) {
            filter = filter.with_repository(repository);
        }

        if let Some(project_key) = non_empty(self.project_key.as_deref()) {
            filter = filter.with_project_key(project_key);
        }

        if let Some(status) = non_empty(self.status.as_deref()) {
            let status = status.parse::<DeploymentStatus>().map_err(|_| {
                ErrorKind::InvalidEnumValue
                    .with_message(format!("Unknown deployment status '{status}'"))
                    .with_resource("status")
                    .with_suggestion("Use 'success' or 'failure'")
            })?;
            filter = filter.with_status(status);
        }

        Ok(filter)
    }

    /// Builds the keyset pagination, rejecting undecodable cursors.
    pub fn pagination(&self) -> Result<CursorPagination> {
        let after = self
            .cursor
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
            .map(|cursor| {
                Cursor::decode(cursor).ok_or_else(|| {
                    ErrorKind::BadRequest
                        .with_message("Invalid pagination cursor")
                        .with_resource("cursor")
                        .with_suggestion("Pass the nextCursor value of a previous page unchanged")
                })
            })
            .transpose()?;

        let pagination =
            CursorPagination::new(self.limit.unwrap_or(DEFAULT_PAGE_SIZE)).with_after(after);

        Ok(if self.include_count.unwrap_or(false) {
            pagination.with_count()
        } else {
            pagination
        })
    }
}

/// Returns the trimmed-non-empty value of a required text field.
fn required_text(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing_field(field)),
    }
}

fn missing_field(field: &'static str) -> Error<'static> {
    ErrorKind::MissingField
        .with_message(format!("Field '{field}' is required"))
        .with_resource(field)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Parses an RFC 3339 timestamp that carries an explicit UTC offset.
pub(crate) fn parse_timestamp(field: &'static str, value: &str) -> Result<Timestamp> {
    value.trim().parse::<Timestamp>().map_err(|err| {
        ErrorKind::InvalidTimestamp
            .with_message(format!("Field '{field}' is not a valid timestamp"))
            .with_resource(field)
            .with_context(err.to_string())
            .with_suggestion("Use RFC 3339 with an offset, e.g. 2025-10-20T14:00:26Z")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateDeployment {
        CreateDeployment {
            project_key: Some("proj".into()),
            commit_sha: Some("a".repeat(40)),
            status: Some("success".into()),
            commit_timestamp: Some("2025-10-20T10:56:13-03:00".into()),
            deployment_timestamp: Some("2025-10-20T14:00:26Z".into()),
            branch: Some("master".into()),
            repository: Some("org/repo".into()),
            lead_time_seconds: Some(253),
            workflow_run: None,
        }
    }

    fn convert(request: CreateDeployment) -> Result<NewDeploymentEvent> {
        request.into_model(Uuid::now_v7(), Timestamp::now())
    }

    #[test]
    fn valid_request_converts() {
        let event = convert(valid_request()).unwrap();
        assert_eq!(event.status, DeploymentStatus::Success);
        assert_eq!(event.lead_time_seconds, 253);

        let commit: Timestamp = event.commit_timestamp.into();
        let deploy: Timestamp = event.deployment_timestamp.into();
        assert_eq!(deploy.duration_since(commit).as_secs(), 253);
    }

    #[test]
    fn first_missing_field_is_reported() {
        let error = convert(CreateDeployment::default()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingField);
        assert_eq!(error.resource(), Some("projectKey"));

        let request = CreateDeployment {
            branch: Some("   ".into()),
            lead_time_seconds: None,
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.resource(), Some("branch"));

        let request = CreateDeployment {
            lead_time_seconds: None,
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.resource(), Some("leadTimeSeconds"));
    }

    #[test]
    fn missing_fields_win_over_bad_values() {
        let request = CreateDeployment {
            status: Some("rollback".into()),
            repository: None,
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingField);
        assert_eq!(error.resource(), Some("repository"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        for status in ["rollback", "Success", "FAILURE"] {
            let request = CreateDeployment {
                status: Some(status.into()),
                ..valid_request()
            };
            let error = convert(request).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidEnumValue);
            assert_eq!(error.resource(), Some("status"));
        }
    }

    #[test]
    fn timestamps_need_offsets() {
        let request = CreateDeployment {
            commit_timestamp: Some("2025-10-20T10:56:13".into()),
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidTimestamp);
        assert_eq!(error.resource(), Some("commitTimestamp"));

        let request = CreateDeployment {
            deployment_timestamp: Some("yesterday".into()),
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.resource(), Some("deploymentTimestamp"));
    }

    #[test]
    fn inverted_timestamps_are_rejected() {
        let request = CreateDeployment {
            commit_timestamp: Some("2025-10-20T15:00:00Z".into()),
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidTimestamp);
        assert_eq!(error.resource(), Some("deploymentTimestamp"));
    }

    #[test]
    fn equal_timestamps_are_accepted() {
        let request = CreateDeployment {
            commit_timestamp: Some("2025-10-20T14:00:26Z".into()),
            lead_time_seconds: Some(0),
            ..valid_request()
        };
        assert!(convert(request).is_ok());
    }

    #[test]
    fn negative_lead_time_is_rejected() {
        let request = CreateDeployment {
            lead_time_seconds: Some(-1),
            ..valid_request()
        };
        let error = convert(request).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidPayload);
        assert_eq!(error.resource(), Some("leadTimeSeconds"));
    }

    #[test]
    fn blank_workflow_run_is_dropped() {
        let request = CreateDeployment {
            workflow_run: Some(" ".into()),
            ..valid_request()
        };
        assert_eq!(convert(request).unwrap().workflow_run, None);
    }

    #[test]
    fn list_query_rejects_bad_input() {
        let query = ListDeployments {
            status: Some("pending".into()),
            ..Default::default()
        };
        assert_eq!(query.filter().unwrap_err().kind(), ErrorKind::InvalidEnumValue);

        let query = ListDeployments {
            from: Some("2025-10-21T00:00:00Z".into()),
            to: Some("2025-10-20T00:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(query.filter().unwrap_err().kind(), ErrorKind::InvalidTimestamp);

        let query = ListDeployments {
            cursor: Some("not-a-cursor".into()),
            ..Default::default()
        };
        assert_eq!(query.pagination().unwrap_err().kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn list_query_clamps_limit() {
        let query = ListDeployments {
            limit: Some(1_000),
            include_count: Some(true),
            ..Default::default()
        };
        let pagination = query.pagination().unwrap();
        assert_eq!(pagination.limit, 100);
        assert!(pagination.include_count);

        let pagination = ListDeployments::default().pagination().unwrap();
        assert_eq!(pagination.limit, DEFAULT_PAGE_SIZE);
        assert!(!pagination.include_count);
    }
}
