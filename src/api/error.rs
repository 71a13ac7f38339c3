//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::cart::CartError;
use crate::core_state::CoreError;
use crate::scan::RecognitionError;
use crate::store::StoreError;

/// Message shown to the user when recognition fails for any engine-side
/// reason. The real cause is logged, not sent.
pub const SCAN_FAILED_MESSAGE: &str =
    "Failed to scan image. Please try again or enter manually.";

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("A scan is already in progress")]
    ScanInProgress,
    #[error("Checkout already in progress")]
    CheckoutInProgress,
    #[error("Unsupported or unreadable image data")]
    UnreadableImage,
    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::ScanInProgress => (
                StatusCode::CONFLICT,
                "SCAN_IN_PROGRESS",
                "A scan is already in progress. Wait for it to finish.".to_string(),
            ),
            ApiError::CheckoutInProgress => (
                StatusCode::CONFLICT,
                "CHECKOUT_IN_PROGRESS",
                "Checkout already in progress".to_string(),
            ),
            ApiError::UnreadableImage => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNREADABLE_IMAGE",
                "That file does not look like a photo. Upload a JPEG or PNG of the label."
                    .to_string(),
            ),
            ApiError::RecognitionFailed(detail) => {
                tracing::error!(detail, "Label recognition failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "RECOGNITION_FAILED",
                    SCAN_FAILED_MESSAGE.to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
            CoreError::Store(StoreError::EmptyName) => {
                ApiError::BadRequest("Medication name is required".into())
            }
            CoreError::Store(e) => ApiError::Internal(e.to_string()),
            CoreError::Cart(CartError::EmptyCart) => ApiError::BadRequest("Cart is empty".into()),
            CoreError::Cart(CartError::CheckoutInFlight) => ApiError::CheckoutInProgress,
            CoreError::Recognition(RecognitionError::UnreadableImage) => ApiError::UnreadableImage,
            CoreError::Recognition(e) => ApiError::RecognitionFailed(e.to_string()),
            CoreError::ScanInFlight => ApiError::ScanInProgress,
            CoreError::RecognitionTask(e) => ApiError::Internal(e),
            CoreError::UnknownScheduleEntry(id) => {
                ApiError::NotFound(format!("No schedule entry with id {id}"))
            }
            CoreError::UnknownMedication(id) => {
                ApiError::NotFound(format!("No medication with id {id}"))
            }
        }
    }
}
