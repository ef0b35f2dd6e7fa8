use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::error::DomainError;
use crate::domain::repo::{UsersRepository, WriteOutcome};

/// Current time at the precision every backend stores.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Access layer for users. Depends only on the repository port.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "users.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self
            .repo
            .list_all()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    /// `None` when the user does not exist.
    #[instrument(name = "users.service.find_user", skip(self), fields(user_id = id))]
    pub async fn find_user(&self, id: i32) -> Result<Option<User>, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        self.find_user(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users.service.user_exists", skip(self), fields(user_id = id))]
    pub async fn user_exists(&self, id: i32) -> Result<bool, DomainError> {
        self.repo
            .exists(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(
        name = "users.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");
        let user = self
            .repo
            .insert(new_user, now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    /// Total overwrite: the stored row is rebuilt from `update` alone and
    /// `date_modified` is stamped with the current time.
    #[instrument(name = "users.service.update_user", skip(self, update), fields(user_id = update.id))]
    pub async fn update_user(&self, update: UserUpdate) -> Result<(), DomainError> {
        info!("Updating user");
        let id = update.id;
        let user = User {
            id,
            name: update.name,
            email: update.email,
            date_created: update.date_created.trunc_subsecs(6),
            date_modified: now(),
            deleted: update.deleted,
        };

        let outcome = self
            .repo
            .update(user)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match outcome {
            WriteOutcome::Written => {
                info!("Successfully updated user");
                Ok(())
            }
            WriteOutcome::Conflict => {
                if self.user_exists(id).await? {
                    warn!("Update rejected although the user still exists");
                    Err(DomainError::concurrency_conflict(id))
                } else {
                    Err(DomainError::user_not_found(id))
                }
            }
        }
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting user");
        if !self.user_exists(id).await? {
            return Err(DomainError::user_not_found(id));
        }

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        // Removed by someone else between the check and the delete.
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_microsecond_precision() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000, 0);
    }
}
