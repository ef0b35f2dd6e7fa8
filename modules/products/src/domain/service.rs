use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewProduct, Product, ProductUpdate};
use crate::domain::error::DomainError;
use crate::domain::repo::{ProductsRepository, WriteOutcome};

/// Current time at the precision every backend stores.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Access layer for products. Depends only on the repository port.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ProductsRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn ProductsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "products.service.list_products", skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let products = self
            .repo
            .list_all()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Listed {} products", products.len());
        Ok(products)
    }

    /// `None` when the product does not exist.
    #[instrument(name = "products.service.find_product", skip(self), fields(product_id = id))]
    pub async fn find_product(&self, id: i32) -> Result<Option<Product>, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    pub async fn get_product(&self, id: i32) -> Result<Product, DomainError> {
        self.find_product(id)
            .await?
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    #[instrument(name = "products.service.product_exists", skip(self), fields(product_id = id))]
    pub async fn product_exists(&self, id: i32) -> Result<bool, DomainError> {
        self.repo
            .exists(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(
        name = "products.service.create_product",
        skip(self, new_product),
        fields(product_name = %new_product.name)
    )]
    pub async fn create_product(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        info!("Creating new product");
        let product = self
            .repo
            .insert(new_product, now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("Successfully created product with id={}", product.id);
        Ok(product)
    }

    /// Total overwrite: the stored row is rebuilt from `update` alone and
    /// `date_modified` is stamped with the current time.
    #[instrument(name = "products.service.update_product", skip(self, update), fields(product_id = update.id))]
    pub async fn update_product(&self, update: ProductUpdate) -> Result<(), DomainError> {
        info!("Updating product");
        let id = update.id;
        let product = Product {
            id,
            name: update.name,
            quantity: update.quantity,
            price: update.price,
            date_created: update.date_created.trunc_subsecs(6),
            date_modified: now(),
            deleted: update.deleted,
        };

        let outcome = self
            .repo
            .update(product)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match outcome {
            WriteOutcome::Written => {
                info!("Successfully updated product");
                Ok(())
            }
            WriteOutcome::Conflict => {
                if self.product_exists(id).await? {
                    warn!("Update rejected although the product still exists");
                    Err(DomainError::concurrency_conflict(id))
                } else {
                    Err(DomainError::product_not_found(id))
                }
            }
        }
    }

    #[instrument(name = "products.service.delete_product", skip(self), fields(product_id = id))]
    pub async fn delete_product(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting product");
        if !self.product_exists(id).await? {
            return Err(DomainError::product_not_found(id));
        }

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        // Removed by someone else between the check and the delete.
        if !deleted {
            return Err(DomainError::product_not_found(id));
        }

        info!("Successfully deleted product");
        Ok(())
    }
}
