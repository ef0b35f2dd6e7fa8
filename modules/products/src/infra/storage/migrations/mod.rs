use sea_orm_migration::prelude::*;

mod m20240101_000001_create_products;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_products::Migration)]
    }

    // Each module tracks its own migrations.
    fn migration_table_name() -> DynIden {
        Alias::new("products_migrations").into_iden()
    }
}
