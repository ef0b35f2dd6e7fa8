use sea_orm::DbBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(create_table(manager.get_database_backend()))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

fn create_table(backend: DbBackend) -> TableCreateStatement {
    Table::create()
        .table(Products::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Products::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Products::Name).string().not_null())
        .col(
            ColumnDef::new(Products::Quantity)
                .integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Products::Price).double().not_null())
        .col(timestamp(Products::DateCreated, backend))
        .col(timestamp(Products::DateModified, backend))
        .col(
            ColumnDef::new(Products::Deleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .to_owned()
}

/// Microsecond UTC timestamp. MySQL's plain `timestamp` drops fractions and
/// stops at 2038, so it gets `datetime(6)` instead.
fn timestamp(col: Products, backend: DbBackend) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    match backend {
        DbBackend::MySql => def.custom(Alias::new("datetime(6)")),
        _ => def.timestamp_with_time_zone(),
    };
    def.not_null();
    def
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Quantity,
    Price,
    DateCreated,
    DateModified,
    Deleted,
}
