use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use modkit::api::{problem::ProblemResponse, ValidatedJson};
use tracing::{error, info};

use crate::api::rest::dto::{CreateUserReq, UpdateUserReq, UserDto};
use crate::api::rest::error::{id_mismatch, map_domain_error};
use crate::api::rest::routes::COLLECTION_PATH;
use crate::domain::service::Service;

pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    info!("Listing users");

    match svc.list_users().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new user; `Location` points at the new resource.
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidatedJson(req_body): ValidatedJson<CreateUserReq>,
) -> Result<impl IntoResponse, ProblemResponse> {
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => {
            let location = format!("{COLLECTION_PATH}/{}", user.id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(UserDto::from(user)),
            ))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Replace a user; the path id must match the body id.
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    ValidatedJson(req_body): ValidatedJson<UpdateUserReq>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Updating user {} with: {:?}", id, req_body);

    if req_body.id != id {
        return Err(id_mismatch(id, req_body.id, uri.path()));
    }

    match svc.update_user(req_body.into()).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
