//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::contract::model::{NewProduct, Product};
use crate::domain::repo::{ProductsRepository, WriteOutcome};
use crate::infra::storage::entity::{ActiveModel as ProductAM, Column, Entity as ProductEntity};

pub struct SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> ProductsRepository for SeaOrmProductsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_all(&self) -> anyhow::Result<Vec<Product>> {
        let rows = ProductEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Product>> {
        let found = ProductEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn exists(&self, id: i32) -> anyhow::Result<bool> {
        let count = ProductEntity::find()
            .filter(Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, new_product: NewProduct, at: DateTime<Utc>) -> anyhow::Result<Product> {
        let m = ProductAM {
            id: NotSet,
            name: Set(new_product.name),
            quantity: Set(new_product.quantity),
            price: Set(new_product.price),
            date_created: Set(at),
            date_modified: Set(at),
            deleted: Set(false),
        };
        let row = m.insert(&self.conn).await.context("insert failed")?;
        Ok(row.into())
    }

    async fn update(&self, u: Product) -> anyhow::Result<WriteOutcome> {
        let m = ProductAM {
            id: Set(u.id),
            name: Set(u.name),
            quantity: Set(u.quantity),
            price: Set(u.price),
            date_created: Set(u.date_created),
            date_modified: Set(u.date_modified),
            deleted: Set(u.deleted),
        };
        match m.update(&self.conn).await {
            Ok(_) => Ok(WriteOutcome::Written),
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => Ok(WriteOutcome::Conflict),
            Err(e) => Err(anyhow::Error::new(e).context("update failed")),
        }
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let res = ProductEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}
