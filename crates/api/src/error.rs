//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::PurchaseError;
use store::StoreError;
use thiserror::Error;

/// Body returned for every 500 response.
pub const GENERIC_ERROR: &str = "An error occurred";

/// API-level error type that maps to HTTP responses.
///
/// Bodies are plain text. Only an insufficient balance is reported to the
/// caller verbatim; everything else, including unknown customers and
/// products, becomes a 500 with a generic body.
#[derive(Debug)]
pub enum ApiError {
    /// The request was understood but rejected; the message is returned.
    BadRequest(String),
    /// Any other failure; the cause is logged, not returned.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response()
            }
        }
    }
}

impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::InsufficientFunds { .. } => ApiError::BadRequest(err.to_string()),
            PurchaseError::CustomerNotFound(_)
            | PurchaseError::ProductNotFound(_)
            | PurchaseError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to connect to the database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
