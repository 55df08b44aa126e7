//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use aide::axum::ApiRouter;
//! use dora_server::handler::routes;
//! use dora_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config).await?;
//!
//! let router: ApiRouter<ServiceState> = routes();
//! let app: axum::Router = axum::Router::from(router).with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod deployments;
mod error;
mod metrics;
mod monitors;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(deployments::routes())
        .merge(metrics::routes())
        .merge(monitors::routes())
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use aide::axum::ApiRouter;
    use axum::Router;
    use axum_test::TestServer;
    use dora_postgres::model::{DeploymentEvent, NewDeploymentEvent};
    use dora_postgres::types::{CursorPage, CursorPagination, DeploymentFilter};
    use uuid::Uuid;

    use crate::handler::routes;
    use crate::service::store::{
        DeploymentStore, MemoryStore, SharedStore, StoreError, StoreResult,
    };
    use crate::service::{ServiceConfig, ServiceState};

    /// Store whose every operation fails.
    #[derive(Debug, Clone, Copy)]
    pub struct FailingStore;

    impl FailingStore {
        fn error() -> StoreError {
            StoreError::Unavailable("store is offline".into())
        }
    }

    #[async_trait::async_trait]
    impl DeploymentStore for FailingStore {
        fn backend(&self) -> &'static str {
            "failing"
        }

        async fn append(&self, _event: NewDeploymentEvent) -> StoreResult<DeploymentEvent> {
            Err(Self::error())
        }

        async fn find(&self, _event_id: Uuid) -> StoreResult<Option<DeploymentEvent>> {
            Err(Self::error())
        }

        async fn list_page(
            &self,
            _filter: &DeploymentFilter,
            _pagination: CursorPagination,
        ) -> StoreResult<CursorPage<DeploymentEvent>> {
            Err(Self::error())
        }

        async fn health(&self) -> StoreResult<()> {
            Err(Self::error())
        }
    }

    /// Returns a new [`ServiceState`] backed by the given store.
    pub fn create_test_state(store: SharedStore) -> ServiceState {
        ServiceState::with_store(store, &ServiceConfig::default())
    }

    /// Returns a new [`TestServer`] with the given router.
    pub async fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> ApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let state = create_test_state(Arc::new(MemoryStore::new()));
        let router = router(state.clone());
        create_test_server_with_state(router, state).await
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub async fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = Router::from(router).with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router over the given store.
    pub async fn create_test_server_with_store(store: SharedStore) -> anyhow::Result<TestServer> {
        create_test_server_with_state(routes(), create_test_state(store)).await
    }

    /// Returns a new [`TestServer`] with the default router and an empty store.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with_store(Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/api/dora/unknown").await;
        response.assert_status_not_found();

        Ok(())
    }
}
