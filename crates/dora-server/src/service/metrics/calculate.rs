//! The four DORA metrics.
//!
//! [`MetricsAccumulator`] consumes events one at a time in aggregation order
//! (`deployment_timestamp`, then `created_at`, then `id`), so the aggregator
//! can feed it page by page without holding the whole window in memory.

use std::collections::HashMap;

use dora_postgres::model::DeploymentEvent;
use dora_postgres::types::DeploymentStatus;
use jiff::Timestamp;

use super::statistics::Summary;
use super::window::{Granularity, MetricsWindow};

/// Successful deployments per granularity unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeploymentFrequency {
    /// Number of successful deployments in the window.
    pub count: u64,
    /// Unit the rate is expressed in.
    pub granularity: Granularity,
    /// `count` divided by the window length in units.
    pub rate: f64,
}

/// Lead time for changes over successful deployments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadTime {
    pub median_seconds: f64,
    pub mean_seconds: f64,
    /// Number of successful deployments sampled.
    pub count: u64,
}

/// Share of deployments that failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeFailureRate {
    pub failures: u64,
    pub total: u64,
    /// Percentage in `0..=100`; `None` when the window holds no events.
    pub rate: Option<f64>,
}

/// Time from a failed deployment to the next successful one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeToRestore {
    /// `None` when no incident was resolved.
    pub median_seconds: Option<f64>,
    /// `None` when no incident was resolved.
    pub mean_seconds: Option<f64>,
    /// Failures followed by a success in the same repository.
    pub resolved: u64,
    /// Failures with no later success in the window.
    pub unresolved: u64,
}

/// All four metrics computed over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct DoraMetrics {
    pub window: MetricsWindow,
    pub deployment_frequency: DeploymentFrequency,
    /// `None` when the window holds no successful deployment.
    pub lead_time: Option<LeadTime>,
    pub change_failure_rate: ChangeFailureRate,
    pub time_to_restore: TimeToRestore,
}

impl DoraMetrics {
    /// Computes the metrics over an unordered slice of events.
    ///
    /// Events outside the window are ignored.
    pub fn from_events(
        events: &[DeploymentEvent],
        window: MetricsWindow,
        granularity: Granularity,
    ) -> Self {
        let mut ordered: Vec<&DeploymentEvent> = events.iter().collect();
        ordered.sort_by_key(|event| event.order_key());

        let mut accumulator = MetricsAccumulator::new(window, granularity);
        for event in ordered {
            accumulator.push(event);
        }

        accumulator.finish()
    }
}

/// Incremental metric state.
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    window: MetricsWindow,
    granularity: Granularity,
    successes: u64,
    failures: u64,
    lead_times: Vec<i64>,
    restore_times: Vec<i64>,
    /// Unresolved failure timestamps keyed by repository.
    open_incidents: HashMap<String, Vec<Timestamp>>,
}

impl MetricsAccumulator {
    /// Creates an empty accumulator for the window.
    pub fn new(window: MetricsWindow, granularity: Granularity) -> Self {
        Self {
            window,
            granularity,
            successes: 0,
            failures: 0,
            lead_times: Vec::new(),
            restore_times: Vec::new(),
            open_incidents: HashMap::new(),
        }
    }

    /// Feeds the next event.
    ///
    /// Events must arrive in aggregation order; events outside the window
    /// are skipped.
    pub fn push(&mut self, event: &DeploymentEvent) {
        let deployed_at = event.deployed_at();
        if !self.window.contains(deployed_at) {
            return;
        }

        match event.status {
            DeploymentStatus::Success => {
                self.successes += 1;
                self.lead_times.push(event.lead_time_seconds);

                if let Some(failures) = self.open_incidents.remove(&event.repository) {
                    self.restore_times.extend(
                        failures
                            .into_iter()
                            .map(|failed_at| deployed_at.duration_since(failed_at).as_secs()),
                    );
                }
            }
            DeploymentStatus::Failure => {
                self.failures += 1;
                self.open_incidents
                    .entry(event.repository.clone())
                    .or_default()
                    .push(deployed_at);
            }
        }
    }

    /// Returns the number of events counted so far.
    #[inline]
    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    /// Produces the final metrics.
    pub fn finish(mut self) -> DoraMetrics {
        let total = self.total();

        let deployment_frequency = DeploymentFrequency {
            count: self.successes,
            granularity: self.granularity,
            rate: self.successes as f64 / self.window.units(self.granularity),
        };

        let lead_time = Summary::of(&mut self.lead_times).map(|summary| LeadTime {
            median_seconds: summary.median,
            mean_seconds: summary.mean,
            count: summary.count,
        });

        let change_failure_rate = ChangeFailureRate {
            failures: self.failures,
            total,
            rate: (total > 0).then(|| self.failures as f64 / total as f64 * 100.0),
        };

        let restore = Summary::of(&mut self.restore_times);
        let unresolved = self.open_incidents.values().map(Vec::len).sum::<usize>() as u64;
        let time_to_restore = TimeToRestore {
            median_seconds: restore.map(|summary| summary.median),
            mean_seconds: restore.map(|summary| summary.mean),
            resolved: restore.map_or(0, |summary| summary.count),
            unresolved,
        };

        DoraMetrics {
            window: self.window,
            deployment_frequency,
            lead_time,
            change_failure_rate,
            time_to_restore,
        }
    }
}
