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
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

fn create_table(backend: DbBackend) -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Users::Name).string().null())
        .col(ColumnDef::new(Users::Email).string().not_null())
        .col(timestamp(Users::DateCreated, backend))
        .col(timestamp(Users::DateModified, backend))
        .col(
            ColumnDef::new(Users::Deleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .to_owned()
}

/// Microsecond UTC timestamp. MySQL's plain `timestamp` drops fractions and
/// stops at 2038, so it gets `datetime(6)` instead.
fn timestamp(col: Users, backend: DbBackend) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    match backend {
        DbBackend::MySql => def.custom(Alias::new("datetime(6)")),
        _ => def.timestamp_with_time_zone(),
    };
    def.not_null();
    def
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    DateCreated,
    DateModified,
    Deleted,
}
