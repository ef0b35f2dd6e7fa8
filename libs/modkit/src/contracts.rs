use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

pub use crate::api::OpenApiRegistry;

#[async_trait]
pub trait DbModule: Send + Sync {
    /// Runs BEFORE REST/start; brings the module's schema up to date.
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()>;
}

/// Pure wiring; must be sync. Runs AFTER DB migrations.
pub trait RestfulModule: Send + Sync {
    fn register_rest(&self, router: Router, openapi: &dyn OpenApiRegistry)
        -> anyhow::Result<Router>;
}

/// REST host module: owns the router and the OpenAPI registry.
/// Must be sync. Runs during the REST phase, but doesn't start the server.
pub trait RestHostModule: Send + Sync + 'static {
    /// Prepare a base Router (e.g., /health) before modules register routes.
    fn rest_prepare(&self, router: Router) -> anyhow::Result<Router>;

    /// Finalize after all modules registered: attach /openapi.json and global
    /// middleware, keep the Router for serving.
    fn rest_finalize(&self, router: Router) -> anyhow::Result<Router>;

    fn as_registry(&self) -> &dyn OpenApiRegistry;
}

#[async_trait]
pub trait StatefulModule: Send + Sync {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()>;
    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()>;
}
