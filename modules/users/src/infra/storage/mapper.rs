use crate::contract::model::User;
use crate::infra::storage::entity::Model as UserEntity;

impl From<UserEntity> for User {
    fn from(e: UserEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            email: e.email,
            date_created: e.date_created,
            date_modified: e.date_modified,
            deleted: e.deleted,
        }
    }
}
