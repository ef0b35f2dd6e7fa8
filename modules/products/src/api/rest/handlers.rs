use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use modkit::api::{problem::ProblemResponse, ValidatedJson};
use tracing::{error, info};

use crate::api::rest::dto::{CreateProductReq, ProductDto, UpdateProductReq};
use crate::api::rest::error::{id_mismatch, map_domain_error};
use crate::api::rest::routes::COLLECTION_PATH;
use crate::domain::service::Service;

pub async fn list_products(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<ProductDto>>, ProblemResponse> {
    info!("Listing products");

    match svc.list_products().await {
        Ok(products) => Ok(Json(products.into_iter().map(ProductDto::from).collect())),
        Err(e) => {
            error!("Failed to list products: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific product by ID
pub async fn get_product(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<ProductDto>, ProblemResponse> {
    info!("Getting product with id: {}", id);

    match svc.get_product(id).await {
        Ok(product) => Ok(Json(ProductDto::from(product))),
        Err(e) => {
            error!("Failed to get product {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new product; `Location` points at the new resource.
pub async fn create_product(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidatedJson(req_body): ValidatedJson<CreateProductReq>,
) -> Result<impl IntoResponse, ProblemResponse> {
    info!("Creating product: {:?}", req_body);

    match svc.create_product(req_body.into()).await {
        Ok(product) => {
            let location = format!("{COLLECTION_PATH}/{}", product.id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(ProductDto::from(product)),
            ))
        }
        Err(e) => {
            error!("Failed to create product: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Replace a product; the path id must match the body id.
pub async fn update_product(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    ValidatedJson(req_body): ValidatedJson<UpdateProductReq>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Updating product {} with: {:?}", id, req_body);

    if req_body.id != id {
        return Err(id_mismatch(id, req_body.id, uri.path()));
    }

    match svc.update_product(req_body.into()).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to update product {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a product by ID
pub async fn delete_product(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting product: {}", id);

    match svc.delete_product(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete product {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
