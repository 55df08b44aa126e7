//! In-memory store backend.
//!
//! Keeps the event log in a `Vec` sorted by the aggregation ordering key, so
//! range reads are a scan from the cursor position.

use std::sync::Arc;

use dora_postgres::model::{DeploymentEvent, NewDeploymentEvent};
use dora_postgres::types::{CursorPage, CursorPagination, DeploymentFilter};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DeploymentStore, StoreResult, TRACING_TARGET};

/// Event store that lives for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Arc<RwLock<Vec<DeploymentEvent>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns whether the store holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl DeploymentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, event: NewDeploymentEvent) -> StoreResult<DeploymentEvent> {
        let event = DeploymentEvent::from(event);
        let key = event.order_key();

        let mut events = self.events.write().await;
        let position = events.partition_point(|stored| stored.order_key() <= key);
        events.insert(position, event.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            event_id = %event.id,
            backend = self.backend(),
            stored = events.len(),
            "Deployment event appended"
        );

        Ok(event)
    }

    async fn find(&self, event_id: Uuid) -> StoreResult<Option<DeploymentEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|event| event.id == event_id).cloned())
    }

    async fn list_page(
        &self,
        filter: &DeploymentFilter,
        pagination: CursorPagination,
    ) -> StoreResult<CursorPage<DeploymentEvent>> {
        let events = self.events.read().await;

        let total = pagination
            .include_count
            .then(|| events.iter().filter(|event| filter.matches(event)).count() as i64);

        let items: Vec<DeploymentEvent> = events
            .iter()
            .filter(|event| {
                pagination
                    .after
                    .is_none_or(|cursor| cursor.precedes(event.order_key()))
            })
            .filter(|event| filter.matches(event))
            .take(pagination.fetch_limit() as usize)
            .cloned()
            .collect();

        Ok(CursorPage::new(
            items,
            total,
            pagination.limit,
            DeploymentEvent::cursor,
        ))
    }

    async fn health(&self) -> StoreResult<()> {
        Ok(())
    }
}
