use axum::http::StatusCode;
use modkit::api::problem::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::ProductNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "PRODUCTS_NOT_FOUND",
            "Product not found",
            format!("Product with id {id} was not found"),
            instance,
        ),
        DomainError::ConcurrencyConflict { id } => {
            tracing::error!(error = ?e, "Concurrency conflict");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PRODUCTS_CONCURRENCY_CONFLICT",
                "Concurrency conflict",
                format!("Product with id {id} was modified concurrently"),
                instance,
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

pub fn id_mismatch(path_id: i32, body_id: i32, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "PRODUCTS_ID_MISMATCH",
        "Id mismatch",
        format!("Path id {path_id} does not match body id {body_id}"),
        instance,
    )
}
