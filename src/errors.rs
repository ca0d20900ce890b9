// src/errors.rs

use crate::models::CascadeReport;
use crate::store::StoreError;
use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    // Store errors
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    // Validation errors
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    // Cascade errors
    #[error(
        "Cascade for {} {} stopped: {} step(s) failed",
        .0.entity,
        .0.entity_id,
        .0.failed_steps().count()
    )]
    PartialCascade(CascadeReport),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing { collection, id } => {
                AppError::NotFound(format!("{} {}", collection, id))
            }
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::Decode(msg) => AppError::StoreUnavailable(msg),
        }
    }
}

// Malformed query strings answer with the same envelope as form errors.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(vec![FieldError::new("query", rejection.body_text())])
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PartialCascade(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut error = json!({
            "code": status.as_u16(),
            "message": self.to_string(),
        });
        match &self {
            AppError::Validation(fields) => error["fields"] = json!(fields),
            AppError::PartialCascade(report) => error["report"] = json!(report),
            _ => {}
        }
        (status, Json(json!({ "error": error }))).into_response()
    }
}

// Convenience alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Collection;

    #[test]
    fn store_errors_map_onto_the_taxonomy() {
        let missing: AppError = StoreError::Missing {
            collection: Collection::Clients,
            id: "c1".into(),
        }
        .into();
        assert!(matches!(missing, AppError::NotFound(ref m) if m == "ClientData c1"));

        let down: AppError = StoreError::Unavailable("timeout".into()).into();
        assert_eq!(down.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_message_lists_every_field() {
        let err = AppError::Validation(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("amount", "Enter a valid amount"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: name: Name is required; amount: Enter a valid amount"
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
