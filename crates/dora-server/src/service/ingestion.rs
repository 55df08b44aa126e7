//! Soft consistency rules applied to accepted deployment events.

use jiff::Timestamp;

/// Checks applied to deployment events after validation.
///
/// Violations are reported, never rejected: the submitted lead time is
/// stored as supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionPolicy {
    lead_time_tolerance_secs: u64,
}

impl IngestionPolicy {
    /// Creates a policy tolerating the given lead-time drift in seconds.
    pub const fn new(lead_time_tolerance_secs: u64) -> Self {
        Self {
            lead_time_tolerance_secs,
        }
    }

    /// Returns the tolerated drift in seconds.
    #[inline]
    pub const fn lead_time_tolerance_secs(&self) -> u64 {
        self.lead_time_tolerance_secs
    }

    /// Returns the drift between the submitted lead time and the timestamp
    /// difference when it exceeds the tolerance.
    pub fn lead_time_drift(
        &self,
        commit_timestamp: Timestamp,
        deployment_timestamp: Timestamp,
        lead_time_seconds: i64,
    ) -> Option<i64> {
        let observed = deployment_timestamp
            .duration_since(commit_timestamp)
            .as_secs();
        let drift = lead_time_seconds.saturating_sub(observed);

        (drift.unsigned_abs() > self.lead_time_tolerance_secs).then_some(drift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    #[test]
    fn drift_within_tolerance() {
        let policy = IngestionPolicy::new(60);
        assert_eq!(policy.lead_time_drift(ts(0), ts(253), 253), None);
        assert_eq!(policy.lead_time_drift(ts(0), ts(253), 300), None);
        assert_eq!(policy.lead_time_drift(ts(0), ts(253), 200), None);
    }

    #[test]
    fn drift_beyond_tolerance() {
        let policy = IngestionPolicy::new(60);
        assert_eq!(policy.lead_time_drift(ts(0), ts(253), 400), Some(147));
        assert_eq!(policy.lead_time_drift(ts(0), ts(253), 0), Some(-253));
    }

    #[test]
    fn zero_tolerance_flags_any_drift() {
        let policy = IngestionPolicy::new(0);
        assert_eq!(policy.lead_time_drift(ts(0), ts(10), 11), Some(1));
        assert_eq!(policy.lead_time_drift(ts(0), ts(10), 10), None);
    }
}
