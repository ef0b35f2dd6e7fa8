use std::sync::Arc;

use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::domain::service::Service;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmProductsRepository;

/// The products resource: schema migrations plus the `/api/product` routes.
#[derive(Clone)]
pub struct ProductsModule {
    service: Arc<Service>,
}

impl ProductsModule {
    /// Wire the SeaORM repository into the service.
    pub fn new(conn: DatabaseConnection) -> Self {
        let repo = SeaOrmProductsRepository::new(conn);
        Self {
            service: Arc::new(Service::new(Arc::new(repo))),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}

#[async_trait]
impl DbModule for ProductsModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running products database migrations");
        Migrator::up(db.seaorm(), None).await?;
        info!("Products database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for ProductsModule {
    fn register_rest(
        &self,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering products REST routes");
        let router = routes::register_routes(router, openapi, self.service.clone())?;
        info!("Products REST routes registered successfully");
        Ok(router)
    }
}
