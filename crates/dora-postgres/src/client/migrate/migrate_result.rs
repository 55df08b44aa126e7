//! Migration status and result types.

use std::time::Duration;

/// Applied and pending migration versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied migration versions in chronological order.
    pub applied_versions: Vec<String>,
    /// Embedded migration versions not yet applied.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Creates a new migration status.
    pub fn new(
        applied_versions: impl Into<Vec<String>>,
        pending_versions: impl Into<Vec<String>>,
    ) -> Self {
        Self {
            applied_versions: applied_versions.into(),
            pending_versions: pending_versions.into(),
        }
    }

    /// Computes the status from the embedded and the applied versions.
    ///
    /// Versions recorded in the database but unknown to the binary count as
    /// applied; they do not make the schema pending.
    pub fn from_versions(embedded: &[String], applied: Vec<String>) -> Self {
        let pending: Vec<String> = embedded
            .iter()
            .filter(|version| !applied.contains(version))
            .cloned()
            .collect();

        Self::new(applied, pending)
    }

    /// Returns the last applied migration version, if any.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    /// Returns the next pending migration version, if any.
    pub fn next_pending_version(&self) -> Option<&str> {
        self.pending_versions.first().map(String::as_str)
    }

    /// Returns the number of applied migrations.
    #[inline]
    pub fn applied_migrations(&self) -> usize {
        self.applied_versions.len()
    }

    /// Returns the number of pending migrations.
    #[inline]
    pub fn pending_migrations(&self) -> usize {
        self.pending_versions.len()
    }

    /// Returns true if all migrations have been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Total duration of the migration operation
    pub duration: Duration,
    /// Versions applied by this run.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Creates a successful migration result.
    pub fn success(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns whether the run applied nothing.
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }

    /// Returns the last processed migration version, if any.
    pub fn last_processed_version(&self) -> Option<&str> {
        self.processed_versions.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_database_is_pending() {
        let status = MigrationStatus::from_versions(&versions(&["20251020000000"]), vec![]);

        assert!(!status.is_up_to_date());
        assert_eq!(status.next_pending_version(), Some("20251020000000"));
        assert_eq!(status.last_applied_version(), None);
    }

    #[test]
    fn applied_database_is_up_to_date() {
        let embedded = versions(&["20251020000000"]);
        let status = MigrationStatus::from_versions(&embedded, embedded.clone());

        assert!(status.is_up_to_date());
        assert_eq!(status.applied_migrations(), 1);
        assert_eq!(status.pending_migrations(), 0);
    }

    #[test]
    fn unknown_applied_versions_do_not_block() {
        let status = MigrationStatus::from_versions(
            &versions(&["001", "002"]),
            versions(&["000", "001"]),
        );

        assert_eq!(status.pending_versions, versions(&["002"]));
        assert_eq!(status.last_applied_version(), Some("001"));
    }

    #[test]
    fn migration_result_no_op() {
        let result = MigrationResult::success(Duration::from_millis(100), vec![]);
        assert!(result.is_no_op());
        assert_eq!(result.last_processed_version(), None);
    }
}
