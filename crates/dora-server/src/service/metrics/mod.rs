//! DORA metric computation.
//!
//! Metrics are derived on demand from the immutable event log; nothing is
//! kept as running state between requests.

mod aggregator;
mod calculate;
mod statistics;
mod window;

pub use self::aggregator::{DEFAULT_AGGREGATION_PAGE_SIZE, MetricsAggregator, MetricsQuery};
pub use self::calculate::{
    ChangeFailureRate, DeploymentFrequency, DoraMetrics, LeadTime, MetricsAccumulator,
    TimeToRestore,
};
pub use self::statistics::Summary;
pub use self::window::{DEFAULT_WINDOW, Granularity, MetricsWindow, WindowError};

/// Tracing target for metric computation.
pub(crate) const TRACING_TARGET: &str = "dora_server::service::metrics";
