use chrono::{DateTime, Utc};

/// Stored user record (no serde/utoipa; the REST layer has its own DTOs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    /// Soft-delete marker. Stored and returned, never used to filter reads.
    pub deleted: bool,
}

/// Data for creating a new user; id and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
}

/// Full replacement of a user row. Every persisted field except
/// `date_modified` comes from the caller; nothing is merged from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub date_created: DateTime<Utc>,
    pub deleted: bool,
}
