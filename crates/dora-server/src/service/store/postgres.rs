//! PostgreSQL store backend.

use dora_postgres::PgClient;
use dora_postgres::model::{DeploymentEvent, NewDeploymentEvent};
use dora_postgres::query::DeploymentEventRepository;
use dora_postgres::types::{CursorPage, CursorPagination, DeploymentFilter};
use uuid::Uuid;

use super::{DeploymentStore, StoreResult, TRACING_TARGET};

/// Event store backed by the `deployment_events` table.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pg_client: PgClient,
}

impl PostgresStore {
    /// Creates a store on top of a connection pool.
    pub fn new(pg_client: PgClient) -> Self {
        Self { pg_client }
    }

    /// Returns the underlying client.
    pub fn pg_client(&self) -> &PgClient {
        &self.pg_client
    }
}

#[async_trait::async_trait]
impl DeploymentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn append(&self, event: NewDeploymentEvent) -> StoreResult<DeploymentEvent> {
        let mut conn = self.pg_client.get_connection().await?;
        let event = conn.create_deployment_event(event).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            event_id = %event.id,
            backend = self.backend(),
            "Deployment event appended"
        );

        Ok(event)
    }

    async fn find(&self, event_id: Uuid) -> StoreResult<Option<DeploymentEvent>> {
        let mut conn = self.pg_client.get_connection().await?;
        Ok(conn.find_deployment_event_by_id(event_id).await?)
    }

    async fn list_page(
        &self,
        filter: &DeploymentFilter,
        pagination: CursorPagination,
    ) -> StoreResult<CursorPage<DeploymentEvent>> {
        let mut conn = self.pg_client.get_connection().await?;
        let page = conn
            .cursor_list_deployment_events(filter.clone(), pagination)
            .await?;

        Ok(page)
    }

    async fn health(&self) -> StoreResult<()> {
        self.pg_client.ping().await?;
        Ok(())
    }
}
