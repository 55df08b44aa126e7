//! OpenAPI specification middleware with Scalar UI integration.
//!
//! Generates the OpenAPI document from aide's [`ApiRouter`] and serves it
//! together with the Scalar reference UI.
//!
//! # Usage
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use dora_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//!
//! let app: Router<()> = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default());
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, OpenApi, Tag};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// OpenAPI configuration for aide integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON specification.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to add OpenAPI documentation with Scalar UI.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Adds OpenAPI documentation routes with the default API info.
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;

    /// Adds OpenAPI documentation routes with custom OpenAPI info.
    ///
    /// [`Info`]: aide::openapi::Info
    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "DORA Metrics API".to_owned(),
            summary: Some("Deployment event ingestion and DORA metrics".to_owned()),
            description: Some(
                "Records deployment events reported by CI pipelines and derives \
                deployment frequency, lead time for changes, change failure rate \
                and time to restore service from them."
                    .to_owned(),
            ),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let tags = [
            ("Deployments", "Deployment event ingestion and lookup"),
            ("Metrics", "DORA metrics over a time window"),
            ("Monitors", "Service health"),
        ]
        .into_iter()
        .map(|(name, description)| Tag {
            name: name.to_owned(),
            description: Some(description.to_owned()),
            ..Tag::default()
        })
        .collect();

        let mut api = OpenApi {
            info,
            tags,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::handler::routes;
    use crate::handler::test::create_test_state;
    use crate::service::store::MemoryStore;

    #[tokio::test]
    async fn serves_generated_document() -> anyhow::Result<()> {
        let state = create_test_state(std::sync::Arc::new(MemoryStore::new()));
        let app = routes()
            .with_open_api(OpenApiConfig::default())
            .with_state(state);
        let server = axum_test::TestServer::new(app)?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document = response.json::<Value>();
        assert_eq!(document["info"]["title"], "DORA Metrics API");
        assert!(document["paths"]["/api/dora/deployment"]["post"].is_object());
        assert!(document["paths"]["/api/dora/metrics"]["get"].is_object());
        assert!(document["paths"]["/health"]["get"].is_object());

        Ok(())
    }
}
