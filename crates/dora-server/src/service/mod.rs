//! Application state and dependency injection.

mod config;
mod ingestion;
pub mod metrics;
pub mod store;

use crate::service::metrics::MetricsAggregator;
use crate::service::store::SharedStore;
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder, StoreBackend};
pub use crate::service::ingestion::IngestionPolicy;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Tracing target for service state setup.
pub(crate) const TRACING_TARGET: &str = "dora_server::service";

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pub store: SharedStore,

    // Internal services:
    pub aggregator: MetricsAggregator,
    pub ingestion: IngestionPolicy,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Opens the configured store backend.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store = config.connect_store().await?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = store.backend(),
            page_size = config.aggregation_page_size,
            "Service state initialized"
        );

        Ok(Self::with_store(store, config))
    }

    /// Builds the state around an already opened store.
    pub fn with_store(store: SharedStore, config: &ServiceConfig) -> Self {
        Self {
            aggregator: MetricsAggregator::new(store.clone(), config.aggregation_page_size),
            ingestion: IngestionPolicy::new(config.lead_time_tolerance_secs),
            store,
        }
    }
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("backend", &self.store.backend())
            .field("aggregator", &self.aggregator)
            .field("ingestion", &self.ingestion)
            .finish()
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(store: SharedStore);

// Internal services:
impl_di!(aggregator: MetricsAggregator);
impl_di!(ingestion: IngestionPolicy);
