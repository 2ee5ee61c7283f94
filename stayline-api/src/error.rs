use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use stayline_core::booking::BookingRuleError;
use stayline_core::hotel::HotelRuleError;
use stayline_core::repository::StoreError;
use stayline_shared::response::ApiResponse;

/// API failure taxonomy. Every variant renders as the response envelope
/// with `success: false`; internal detail is logged, not surfaced.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Unique-constraint hits are business-rule violations (e.g. a
            // second outstanding transfer for one booking), not faults.
            StoreError::Duplicate(msg) => ApiError::InvalidInput(msg),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<BookingRuleError> for ApiError {
    fn from(err: BookingRuleError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<HotelRuleError> for ApiError {
    fn from(err: HotelRuleError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}
