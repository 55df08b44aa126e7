//! Append-only deployment event store.
//!
//! Handlers and the metrics aggregator talk to the store only through the
//! [`DeploymentStore`] trait, so the PostgreSQL backend can be swapped for
//! the in-memory log in tests and local runs.

mod memory;
mod postgres;

use std::borrow::Cow;
use std::sync::Arc;

use dora_postgres::PgError;
use dora_postgres::model::{DeploymentEvent, NewDeploymentEvent};
use dora_postgres::types::{CursorPage, CursorPagination, DeploymentFilter};
use uuid::Uuid;

pub use self::memory::MemoryStore;
pub use self::postgres::PostgresStore;

/// Tracing target for store operations.
pub(crate) const TRACING_TARGET: &str = "dora_server::service::store";

/// Shared handle to the configured store backend.
pub type SharedStore = Arc<dyn DeploymentStore>;

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The PostgreSQL backend failed.
    #[error(transparent)]
    Postgres(#[from] PgError),

    /// The backend cannot serve the request.
    #[error("event store unavailable: {0}")]
    Unavailable(Cow<'static, str>),
}

impl StoreError {
    /// Returns whether the failure might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Postgres(error) => error.is_transient(),
            Self::Unavailable(_) => true,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;

/// Read and append contract of the deployment event log.
///
/// Range reads return events ordered by `(deployment_timestamp, created_at,
/// id)` ascending, the order the aggregator relies on.
#[async_trait::async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Returns the backend name used in logs and health reports.
    fn backend(&self) -> &'static str;

    /// Appends one event. The row is either fully persisted or not at all.
    async fn append(&self, event: NewDeploymentEvent) -> StoreResult<DeploymentEvent>;

    /// Finds an event by identifier.
    async fn find(&self, event_id: Uuid) -> StoreResult<Option<DeploymentEvent>>;

    /// Returns one keyset page of events matching the filter.
    async fn list_page(
        &self,
        filter: &DeploymentFilter,
        pagination: CursorPagination,
    ) -> StoreResult<CursorPage<DeploymentEvent>>;

    /// Probes the backend.
    async fn health(&self) -> StoreResult<()>;
}
