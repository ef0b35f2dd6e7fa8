use axum::http::StatusCode;
use modkit::api::problem::{from_parts, ProblemResponse};

use crate::domain::error::DomainError;

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::UserNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            instance,
        ),
        DomainError::ConcurrencyConflict { id } => {
            tracing::error!(error = ?e, "Concurrency conflict");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "USERS_CONCURRENCY_CONFLICT",
                "Concurrency conflict",
                format!("User with id {id} was modified concurrently"),
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
        "USERS_ID_MISMATCH",
        "Id mismatch",
        format!("Path id {path_id} does not match body id {body_id}"),
        instance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_code() {
        let p = map_domain_error(&DomainError::user_not_found(7), "/api/user/7").0;
        assert_eq!(p.status, 404);
        assert_eq!(p.code, "USERS_NOT_FOUND");
        assert_eq!(p.instance, "/api/user/7");
        assert!(p.detail.contains('7'));
    }

    #[test]
    fn database_details_are_hidden() {
        let p = map_domain_error(&DomainError::database("secret dsn"), "/api/user").0;
        assert_eq!(p.status, 500);
        assert_eq!(p.code, "INTERNAL_DB");
        assert!(!p.detail.contains("secret"));
    }

    #[test]
    fn conflict_is_a_server_error() {
        let p = map_domain_error(&DomainError::concurrency_conflict(1), "/api/user/1").0;
        assert_eq!(p.status, 500);
        assert_eq!(p.code, "USERS_CONCURRENCY_CONFLICT");
    }
}
