//! API endpoint handlers.
//!
//! Each module corresponds to one screen's data needs. Handlers stay
//! thin: extract, call `CoreState`, wrap the result.

pub mod cart;
pub mod health;
pub mod medications;
pub mod scan;
pub mod schedule;

use crate::api::error::ApiError;

/// Fallback for unknown `/api/*` paths, so API clients always get the
/// structured error body instead of the page-not-found redirect.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Unknown API path".to_string())
}
