//! Deployment status enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Outcome of a single deployment attempt.
///
/// This enumeration corresponds to the `DEPLOYMENT_STATUS` PostgreSQL enum.
/// Only the two listed values are accepted; parsing any other string fails.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::DeploymentStatus"]
pub enum DeploymentStatus {
    /// The deployment reached production.
    #[db_rename = "success"]
    #[serde(rename = "success")]
    #[strum(serialize = "success")]
    Success,

    /// The deployment failed or caused a production incident.
    #[db_rename = "failure"]
    #[serde(rename = "failure")]
    #[strum(serialize = "failure")]
    Failure,
}

impl DeploymentStatus {
    /// Returns whether the deployment succeeded.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, DeploymentStatus::Success)
    }

    /// Returns whether the deployment failed.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, DeploymentStatus::Failure)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_only_known_values() {
        assert_eq!("success".parse(), Ok(DeploymentStatus::Success));
        assert_eq!("failure".parse(), Ok(DeploymentStatus::Failure));
        assert!("Success".parse::<DeploymentStatus>().is_err());
        assert!("rollback".parse::<DeploymentStatus>().is_err());
        assert!("".parse::<DeploymentStatus>().is_err());
    }

    #[test]
    fn display_matches_wire_format() {
        let rendered: Vec<String> = DeploymentStatus::iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, ["success", "failure"]);
    }
}
