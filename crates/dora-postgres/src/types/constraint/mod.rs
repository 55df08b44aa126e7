//! Database constraint violations.
//!
//! Maps constraint names raised by PostgreSQL back to typed values so callers
//! can tell a rejected row apart from an infrastructure failure.

mod deployment_events;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::deployment_events::DeploymentEventConstraints;

/// Unified constraint violation enum for every table of the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    DeploymentEvent(DeploymentEventConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Chronological integrity constraints (timestamp relationships).
    Chronological,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// Returns `None` if the constraint name is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use dora_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("deployment_events_lead_time_non_negative");
    /// assert!(violation.is_some());
    ///
    /// let unknown = ConstraintViolation::new("unknown_constraint");
    /// assert!(unknown.is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        if constraint.starts_with("deployment_events_") {
            return DeploymentEventConstraints::new(constraint).map(Self::DeploymentEvent);
        }

        None
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::DeploymentEvent(_) => "deployment_events",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::DeploymentEvent(c) => c.categorize(),
        }
    }

    /// Returns the API field the violated constraint guards, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConstraintViolation::DeploymentEvent(c) => c.field(),
        }
    }

    /// Returns the constraint name as it appears in PostgreSQL.
    pub fn constraint_name(&self) -> String {
        match self {
            ConstraintViolation::DeploymentEvent(c) => c.to_string(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.constraint_name())
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.constraint_name()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("unknown constraint: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deployment_event_constraints() {
        let violation = ConstraintViolation::new("deployment_events_timestamps_ordered");
        assert_eq!(
            violation,
            Some(ConstraintViolation::DeploymentEvent(
                DeploymentEventConstraints::TimestampsOrdered
            ))
        );

        let violation = violation.unwrap();
        assert_eq!(violation.table_name(), "deployment_events");
        assert_eq!(violation.categorize(), ConstraintCategory::Chronological);
        assert_eq!(violation.field(), Some("deploymentTimestamp"));
    }

    #[test]
    fn rejects_unknown_constraints() {
        assert!(ConstraintViolation::new("deployment_events_unknown").is_none());
        assert!(ConstraintViolation::new("accounts_email_unique").is_none());
        assert!(ConstraintViolation::new("").is_none());
    }

    #[test]
    fn string_round_trip() {
        let name = "deployment_events_commit_sha_not_empty";
        let violation = ConstraintViolation::try_from(name.to_owned()).unwrap();
        assert_eq!(String::from(violation), name);
    }
}
