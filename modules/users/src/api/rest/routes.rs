use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

pub const COLLECTION_PATH: &str = "/api/user";
const ITEM_PATH: &str = "/api/user/{id}";

pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    let mut routes = Router::new();

    // GET /api/user - List all users
    routes = OperationBuilder::<Missing, Missing, ()>::get(COLLECTION_PATH)
        .operation_id("users.list_users")
        .summary("List all users")
        .description("Retrieve every user in storage order")
        .tag("users")
        .handler(handlers::list_users)
        .json_array_response::<dto::UserDto>(openapi, 200, "List of users")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // GET /api/user/{id} - Get a specific user
    routes = OperationBuilder::<Missing, Missing, ()>::get(ITEM_PATH)
        .operation_id("users.get_user")
        .summary("Get user by ID")
        .tag("users")
        .path_param_typed("id", "User id", "integer")
        .handler(handlers::get_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 200, "User found")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // POST /api/user - Create a new user
    routes = OperationBuilder::<Missing, Missing, ()>::post(COLLECTION_PATH)
        .operation_id("users.create_user")
        .summary("Create a new user")
        .tag("users")
        .json_request::<dto::CreateUserReq>(openapi, "User creation data")
        .handler(handlers::create_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 201, "Created user")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // PUT /api/user/{id} - Replace a user
    routes = OperationBuilder::<Missing, Missing, ()>::put(ITEM_PATH)
        .operation_id("users.update_user")
        .summary("Replace user")
        .description("Overwrite every field of a user; the body id must match the path id")
        .tag("users")
        .path_param_typed("id", "User id", "integer")
        .json_request::<dto::UpdateUserReq>(openapi, "Full user record")
        .handler(handlers::update_user)
        .empty_response(204, "User updated")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // DELETE /api/user/{id} - Delete a user
    routes = OperationBuilder::<Missing, Missing, ()>::delete(ITEM_PATH)
        .operation_id("users.delete_user")
        .summary("Delete user")
        .tag("users")
        .path_param_typed("id", "User id", "integer")
        .handler(handlers::delete_user)
        .empty_response(204, "User deleted")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    Ok(router.merge(routes.layer(Extension(service))))
}
