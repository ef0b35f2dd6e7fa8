use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Product not found: {id}")]
    ProductNotFound { id: i32 },

    /// The row still exists but the write was rejected.
    #[error("Concurrent modification of product {id}")]
    ConcurrencyConflict { id: i32 },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn product_not_found(id: i32) -> Self {
        Self::ProductNotFound { id }
    }

    pub fn concurrency_conflict(id: i32) -> Self {
        Self::ConcurrencyConflict { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
