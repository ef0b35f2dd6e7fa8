use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::contract::model::{NewUser, User, UserUpdate};

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub deleted: bool,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// REST DTO for replacing a user. Full-width: omitted optional fields are
/// reset, not preserved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    pub id: i32,
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            date_created: user.date_created,
            date_modified: user.date_modified,
            deleted: user.deleted,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
        }
    }
}

impl From<UpdateUserReq> for UserUpdate {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            id: req.id,
            name: req.name,
            email: req.email,
            date_created: req.date_created,
            deleted: req.deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_dto_uses_camel_case() {
        let t = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let dto = UserDto {
            id: 1,
            name: None,
            email: "a@b.io".into(),
            date_created: t,
            date_modified: t,
            deleted: false,
        };
        let v = serde_json::to_value(dto).unwrap();
        assert!(v.get("dateCreated").is_some());
        assert!(v.get("dateModified").is_some());
        assert!(v.get("date_created").is_none());
    }

    #[test]
    fn create_rejects_malformed_email() {
        let req = CreateUserReq {
            name: None,
            email: "not-an-email".into(),
        };
        let errs = req.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("email"));
    }

    #[test]
    fn update_deleted_defaults_to_false() {
        let req: UpdateUserReq = serde_json::from_value(serde_json::json!({
            "id": 3,
            "email": "a@b.io",
            "dateCreated": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(!req.deleted);
        assert!(req.validate().is_ok());
    }
}
