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

use crate::contract::model::{NewUser, User};
use crate::domain::repo::{UsersRepository, WriteOutcome};
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn exists(&self, id: i32) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, new_user: NewUser, at: DateTime<Utc>) -> anyhow::Result<User> {
        let m = UserAM {
            id: NotSet,
            name: Set(new_user.name),
            email: Set(new_user.email),
            date_created: Set(at),
            date_modified: Set(at),
            deleted: Set(false),
        };
        let row = m.insert(&self.conn).await.context("insert failed")?;
        Ok(row.into())
    }

    async fn update(&self, u: User) -> anyhow::Result<WriteOutcome> {
        let m = UserAM {
            id: Set(u.id),
            name: Set(u.name),
            email: Set(u.email),
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
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}
