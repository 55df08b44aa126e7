//! Deployment events table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Deployment events table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum DeploymentEventConstraints {
    #[strum(serialize = "deployment_events_pkey")]
    PrimaryKey,

    // Required text columns
    #[strum(serialize = "deployment_events_project_key_not_empty")]
    ProjectKeyNotEmpty,
    #[strum(serialize = "deployment_events_repository_not_empty")]
    RepositoryNotEmpty,
    #[strum(serialize = "deployment_events_branch_not_empty")]
    BranchNotEmpty,
    #[strum(serialize = "deployment_events_commit_sha_not_empty")]
    CommitShaNotEmpty,

    // Timing
    #[strum(serialize = "deployment_events_lead_time_non_negative")]
    LeadTimeNonNegative,
    #[strum(serialize = "deployment_events_timestamps_ordered")]
    TimestampsOrdered,
}

impl DeploymentEventConstraints {
    /// Creates a new [`DeploymentEventConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::PrimaryKey => ConstraintCategory::Uniqueness,
            Self::ProjectKeyNotEmpty
            | Self::RepositoryNotEmpty
            | Self::BranchNotEmpty
            | Self::CommitShaNotEmpty
            | Self::LeadTimeNonNegative => ConstraintCategory::Validation,
            Self::TimestampsOrdered => ConstraintCategory::Chronological,
        }
    }

    /// Returns the camelCase request field guarded by this constraint.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::PrimaryKey => None,
            Self::ProjectKeyNotEmpty => Some("projectKey"),
            Self::RepositoryNotEmpty => Some("repository"),
            Self::BranchNotEmpty => Some("branch"),
            Self::CommitShaNotEmpty => Some("commitSha"),
            Self::LeadTimeNonNegative => Some("leadTimeSeconds"),
            Self::TimestampsOrdered => Some("deploymentTimestamp"),
        }
    }
}

impl From<DeploymentEventConstraints> for String {
    #[inline]
    fn from(val: DeploymentEventConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for DeploymentEventConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
