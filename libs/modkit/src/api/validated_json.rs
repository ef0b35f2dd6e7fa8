//! `ValidatedJson<T>`: JSON body extractor that runs `validator::Validate`.
//!
//! Both failure modes become RFC 9457 problems with code `VALIDATION`:
//! - body that does not parse into `T` → 400 with the serde message as `detail`;
//! - parsed body with invalid fields → 400 with one `{detail, pointer}` per field.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::api::problem::{Problem, ProblemResponse, ValidationError};

pub const VALIDATION_CODE: &str = "VALIDATION";

/// Extracts `T` from a JSON body and validates it before the handler runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej| json_rejection_problem(&rej, &instance))?;

        value
            .validate()
            .map_err(|errs| validation_problem(&errs, &instance))?;

        Ok(ValidatedJson(value))
    }
}

fn json_rejection_problem(rej: &JsonRejection, instance: &str) -> ProblemResponse {
    let status = match rej {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            StatusCode::BAD_REQUEST
        }
        other => other.status(),
    };
    tracing::debug!(%status, error = %rej.body_text(), "request body rejected");

    Problem::new(status, "Validation error", rej.body_text())
        .with_type(format!("https://errors.example.com/{VALIDATION_CODE}"))
        .with_code(VALIDATION_CODE)
        .with_instance(instance)
        .with_current_span()
        .into()
}

/// Render `validator` errors as a 400 problem with JSON pointers into the body.
pub fn validation_problem(errs: &ValidationErrors, instance: &str) -> ProblemResponse {
    let errors = field_errors(errs);
    tracing::debug!(count = errors.len(), "request body failed validation");

    let detail = errors
        .iter()
        .map(|e| e.detail.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    Problem::new(StatusCode::BAD_REQUEST, "Validation error", detail)
        .with_type(format!("https://errors.example.com/{VALIDATION_CODE}"))
        .with_code(VALIDATION_CODE)
        .with_instance(instance)
        .with_errors(errors)
        .with_current_span()
        .into()
}

/// Flatten field errors, sorted by pointer so responses are deterministic.
pub fn field_errors(errs: &ValidationErrors) -> Vec<ValidationError> {
    let mut out: Vec<ValidationError> = errs
        .field_errors()
        .into_iter()
        .flat_map(|(field, list)| {
            let json_name = camel_case(&field);
            list.iter().map(move |e| ValidationError {
                detail: match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{json_name}: failed '{}' check", e.code),
                },
                pointer: format!("/{json_name}"),
            })
        })
        .collect();
    out.sort_by(|a, b| a.pointer.cmp(&b.pointer));
    out
}

// DTO fields are snake_case in Rust and camelCase on the wire.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
