use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::contract::model::{NewProduct, Product, ProductUpdate};

/// REST DTO for product representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub deleted: bool,
}

/// REST DTO for creating a new product.
///
/// `price` is optional only at the serde level so that an omitted price is
/// reported as a validation error instead of defaulting to zero.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductReq {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    #[validate(required(message = "is required"))]
    #[schema(required = true)]
    pub price: Option<f64>,
}

/// REST DTO for replacing a product. `dateModified` is accepted for symmetry
/// with [`ProductDto`] but ignored: the server stamps the modification time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductReq {
    pub id: i32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    #[validate(required(message = "is required"))]
    #[schema(required = true)]
    pub price: Option<f64>,
    pub date_created: DateTime<Utc>,
    pub date_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            quantity: product.quantity,
            price: product.price,
            date_created: product.date_created,
            date_modified: product.date_modified,
            deleted: product.deleted,
        }
    }
}

// `price` is checked by `Validate` before either conversion runs.

impl From<CreateProductReq> for NewProduct {
    fn from(req: CreateProductReq) -> Self {
        Self {
            name: req.name,
            quantity: req.quantity,
            price: req.price.unwrap_or_default(),
        }
    }
}

impl From<UpdateProductReq> for ProductUpdate {
    fn from(req: UpdateProductReq) -> Self {
        Self {
            id: req.id,
            name: req.name,
            quantity: req.quantity,
            price: req.price.unwrap_or_default(),
            date_created: req.date_created,
            deleted: req.deleted,
        }
    }
}
