//! Reads a window of events from the store and folds them into metrics.

use dora_postgres::types::{CursorPagination, DeploymentFilter};

use super::calculate::{DoraMetrics, MetricsAccumulator};
use super::window::{Granularity, MetricsWindow};
use super::TRACING_TARGET;
use crate::service::store::{SharedStore, StoreResult};

/// Default number of events read per store round trip.
pub const DEFAULT_AGGREGATION_PAGE_SIZE: i64 = 500;

/// Parameters of one metrics computation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsQuery {
    pub window: MetricsWindow,
    pub granularity: Granularity,
    pub repository: Option<String>,
    pub project_key: Option<String>,
}

impl MetricsQuery {
    /// Creates a query over the window with no repository or project filter.
    pub fn new(window: MetricsWindow, granularity: Granularity) -> Self {
        Self {
            window,
            granularity,
            repository: None,
            project_key: None,
        }
    }

    /// Restricts the query to one repository.
    pub fn with_repository(mut self, repository: Option<String>) -> Self {
        self.repository = repository;
        self
    }

    /// Restricts the query to one project.
    pub fn with_project_key(mut self, project_key: Option<String>) -> Self {
        self.project_key = project_key;
        self
    }

    /// Returns the store filter matching this query.
    pub fn filter(&self) -> DeploymentFilter {
        let mut filter = DeploymentFilter::new().with_window(self.window.from(), self.window.to());
        if let Some(repository) = &self.repository {
            filter = filter.with_repository(repository.clone());
        }
        if let Some(project_key) = &self.project_key {
            filter = filter.with_project_key(project_key.clone());
        }
        filter
    }
}

/// Computes DORA metrics by paging through the event store.
#[derive(Clone)]
pub struct MetricsAggregator {
    store: SharedStore,
    page_size: i64,
}

impl MetricsAggregator {
    /// Creates an aggregator reading `page_size` events per round trip.
    pub fn new(store: SharedStore, page_size: i64) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    /// Returns the configured page size.
    #[inline]
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Computes the metrics for the query.
    ///
    /// Reads are point-in-time per page; events appended while the scan runs
    /// may or may not be included.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET,
        fields(window = %query.window, granularity = %query.granularity)
    )]
    pub async fn compute(&self, query: &MetricsQuery) -> StoreResult<DoraMetrics> {
        let filter = query.filter();
        let mut accumulator = MetricsAccumulator::new(query.window, query.granularity);
        let mut pagination = CursorPagination::unbounded(self.page_size);
        let mut pages = 0usize;

        loop {
            let page = self.store.list_page(&filter, pagination.clone()).await?;
            pages += 1;

            for event in &page.items {
                accumulator.push(event);
            }

            match page.next_cursor {
                Some(cursor) => pagination = pagination.with_after(Some(cursor)),
                None => break,
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            pages,
            events = accumulator.total(),
            backend = self.store.backend(),
            "Metrics computed"
        );

        Ok(accumulator.finish())
    }
}

impl std::fmt::Debug for MetricsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsAggregator")
            .field("backend", &self.store.backend())
            .field("page_size", &self.page_size)
            .finish()
    }
}
