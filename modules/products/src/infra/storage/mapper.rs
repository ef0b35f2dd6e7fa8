use crate::contract::model::Product;
use crate::infra::storage::entity::Model as ProductEntity;

impl From<ProductEntity> for Product {
    fn from(e: ProductEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            quantity: e.quantity,
            price: e.price,
            date_created: e.date_created,
            date_modified: e.date_modified,
            deleted: e.deleted,
        }
    }
}
