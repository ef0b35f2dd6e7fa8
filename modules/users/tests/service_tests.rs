//! Access-layer behavior against a mock repository.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing_test::traced_test;

use users::contract::model::{NewUser, User, UserUpdate};
use users::domain::error::DomainError;
use users::domain::repo::{UsersRepository, WriteOutcome};
use users::domain::service::Service;

// Mock repository with scripted write outcomes
struct MockUsersRepository {
    users: Mutex<Vec<User>>,
    update_outcome: WriteOutcome,
    delete_result: bool,
    fail: bool,
}

impl MockUsersRepository {
    fn new() -> Self {
        Self {
            users: Mutex::new(vec![User {
                id: 1,
                name: Some("Test User".to_string()),
                email: "test@example.com".to_string(),
                date_created: Utc::now(),
                date_modified: Utc::now(),
                deleted: false,
            }]),
            update_outcome: WriteOutcome::Written,
            delete_result: true,
            fail: false,
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UsersRepository for MockUsersRepository {
    async fn list_all(&self) -> Result<Vec<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn insert(&self, new_user: NewUser, at: DateTime<Utc>) -> Result<User> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i32 + 1,
            name: new_user.name,
            email: new_user.email,
            date_created: at,
            date_modified: at,
            deleted: false,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, _u: User) -> Result<WriteOutcome> {
        self.check()?;
        Ok(self.update_outcome)
    }

    async fn delete(&self, _id: i32) -> Result<bool> {
        self.check()?;
        Ok(self.delete_result)
    }
}

fn update_for(id: i32) -> UserUpdate {
    UserUpdate {
        id,
        name: None,
        email: "x@example.com".to_string(),
        date_created: Utc::now(),
        deleted: false,
    }
}

#[traced_test]
#[tokio::test]
async fn create_stamps_both_timestamps_with_same_instant() {
    let service = Service::new(Arc::new(MockUsersRepository::new()));
    let user = service
        .create_user(NewUser {
            name: None,
            email: "new@example.com".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.date_created, user.date_modified);
    assert_eq!(user.id, 2);
}

#[traced_test]
#[tokio::test]
async fn find_returns_none_for_missing_user() {
    let service = Service::new(Arc::new(MockUsersRepository::new()));
    assert!(service.find_user(5).await.unwrap().is_none());
    assert!(matches!(
        service.get_user(5).await,
        Err(DomainError::UserNotFound { id: 5 })
    ));
}

#[traced_test]
#[tokio::test]
async fn conflict_on_vanished_row_is_not_found() {
    let mut repo = MockUsersRepository::new();
    repo.update_outcome = WriteOutcome::Conflict;
    let service = Service::new(Arc::new(repo));

    let err = service.update_user(update_for(9)).await.unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound { id: 9 }));
}

#[traced_test]
#[tokio::test]
async fn conflict_on_existing_row_is_concurrency_conflict() {
    let mut repo = MockUsersRepository::new();
    repo.update_outcome = WriteOutcome::Conflict;
    let service = Service::new(Arc::new(repo));

    let err = service.update_user(update_for(1)).await.unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyConflict { id: 1 }));
}

#[traced_test]
#[tokio::test]
async fn delete_losing_a_race_is_not_found() {
    let mut repo = MockUsersRepository::new();
    repo.delete_result = false;
    let service = Service::new(Arc::new(repo));

    let err = service.delete_user(1).await.unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound { id: 1 }));
}

#[traced_test]
#[tokio::test]
async fn storage_failures_become_database_errors() {
    let mut repo = MockUsersRepository::new();
    repo.fail = true;
    let service = Service::new(Arc::new(repo));

    let err = service.list_users().await.unwrap_err();
    assert!(matches!(err, DomainError::Database { .. }));
    assert!(err.to_string().contains("connection refused"));
}
