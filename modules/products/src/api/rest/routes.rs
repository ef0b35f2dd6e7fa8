use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

pub const COLLECTION_PATH: &str = "/api/product";
const ITEM_PATH: &str = "/api/product/{id}";

pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    let mut routes = Router::new();

    // GET /api/product - List all products
    routes = OperationBuilder::<Missing, Missing, ()>::get(COLLECTION_PATH)
        .operation_id("products.list_products")
        .summary("List all products")
        .description("Retrieve every product in storage order")
        .tag("products")
        .handler(handlers::list_products)
        .json_array_response::<dto::ProductDto>(openapi, 200, "List of products")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // GET /api/product/{id} - Get a specific product
    routes = OperationBuilder::<Missing, Missing, ()>::get(ITEM_PATH)
        .operation_id("products.get_product")
        .summary("Get product by ID")
        .tag("products")
        .path_param_typed("id", "Product id", "integer")
        .handler(handlers::get_product)
        .json_response_with_schema::<dto::ProductDto>(openapi, 200, "Product found")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // POST /api/product - Create a new product
    routes = OperationBuilder::<Missing, Missing, ()>::post(COLLECTION_PATH)
        .operation_id("products.create_product")
        .summary("Create a new product")
        .tag("products")
        .json_request::<dto::CreateProductReq>(openapi, "Product creation data")
        .handler(handlers::create_product)
        .json_response_with_schema::<dto::ProductDto>(openapi, 201, "Created product")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // PUT /api/product/{id} - Replace a product
    routes = OperationBuilder::<Missing, Missing, ()>::put(ITEM_PATH)
        .operation_id("products.update_product")
        .summary("Replace product")
        .description("Overwrite every field of a product; the body id must match the path id")
        .tag("products")
        .path_param_typed("id", "Product id", "integer")
        .json_request::<dto::UpdateProductReq>(openapi, "Full product record")
        .handler(handlers::update_product)
        .empty_response(204, "Product updated")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    // DELETE /api/product/{id} - Delete a product
    routes = OperationBuilder::<Missing, Missing, ()>::delete(ITEM_PATH)
        .operation_id("products.delete_product")
        .summary("Delete product")
        .tag("products")
        .path_param_typed("id", "Product id", "integer")
        .handler(handlers::delete_product)
        .empty_response(204, "Product deleted")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(routes, openapi);

    Ok(router.merge(routes.layer(Extension(service))))
}
