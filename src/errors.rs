use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::db::StoreError;

/// A single violated signup rule, reported in validation-declaration order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Request-level error taxonomy. Every handler failure is converted to a
/// status code and JSON body here; nothing crashes the process per-request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::BadRequest("User already exists".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::BadRequest().json(serde_json::json!({
                "errors": errors
            })),
            ApiError::BadRequest(message) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": message
            })),
            ApiError::Unauthenticated(message) => {
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": message
                }))
            }
            ApiError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Forbidden"
            })),
            ApiError::NotFound(what) => HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("{} not found", what)
            })),
            ApiError::Internal(detail) => {
                // Detail stays server-side; clients get a generic message.
                error!(error = %detail, "Internal server error");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Server error"
                }))
            }
        }
    }
}
