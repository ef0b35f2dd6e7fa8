use async_trait::async_trait;

use crate::contract::model::{NewProduct, Product};

/// Result of an optimistic full-record write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// No row matched the write (changed or removed since it was read).
    Conflict,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// All products, ascending by id.
    async fn list_all(&self) -> anyhow::Result<Vec<Product>>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Product>>;
    async fn exists(&self, id: i32) -> anyhow::Result<bool>;
    /// Insert with both timestamps set to `at`; storage assigns the id.
    async fn insert(&self, new_product: NewProduct, at: chrono::DateTime<chrono::Utc>)
        -> anyhow::Result<Product>;
    /// Overwrite every column of the row with primary key `u.id`.
    async fn update(&self, u: Product) -> anyhow::Result<WriteOutcome>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
}
