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
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// The users resource: schema migrations plus the `/api/user` routes.
#[derive(Clone)]
pub struct UsersModule {
    service: Arc<Service>,
}

impl UsersModule {
    /// Wire the SeaORM repository into the service.
    pub fn new(conn: DatabaseConnection) -> Self {
        let repo = SeaOrmUsersRepository::new(conn);
        Self {
            service: Arc::new(Service::new(Arc::new(repo))),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}

#[async_trait]
impl DbModule for UsersModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running users database migrations");
        Migrator::up(db.seaorm(), None).await?;
        info!("Users database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for UsersModule {
    fn register_rest(
        &self,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering users REST routes");
        let router = routes::register_routes(router, openapi, self.service.clone())?;
        info!("Users REST routes registered successfully");
        Ok(router)
    }
}
