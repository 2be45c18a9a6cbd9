//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, MoneyError, OrderError, RepositoryError, ValidationError};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => domain_status(err),
        };

        if status.is_client_error() {
            tracing::debug!(%status, error = %self, "request rejected");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::Money(_) => StatusCode::BAD_REQUEST,
        DomainError::Order(order_err) => match order_err {
            OrderError::InvalidTransition { .. } | OrderError::AlreadyCanceled => {
                StatusCode::CONFLICT
            }
            OrderError::CurrencyMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            OrderError::Validation(_) | OrderError::Money(_) => StatusCode::BAD_REQUEST,
        },
        DomainError::Repository(
            RepositoryError::ConcurrencyConflict { .. } | RepositoryError::AlreadyExists { .. },
        ) => StatusCode::CONFLICT,
        DomainError::OrderNotFound(_)
        | DomainError::ItemNotFound { .. }
        | DomainError::ProductNotFound(_) => StatusCode::NOT_FOUND,
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<MoneyError> for ApiError {
    fn from(err: MoneyError) -> Self {
        ApiError::Domain(err.into())
    }
}
