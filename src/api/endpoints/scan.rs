//! Label scan endpoint.

use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::scan::ScanOutcome;

/// `POST /api/scan` — multipart upload of one label photo.
///
/// Reads the `image` field, runs recognition plus field extraction, and
/// returns the candidate for the confirmation form. Nothing is stored
/// until the user confirms via `POST /api/medications`.
pub async fn scan(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<ScanOutcome>, ApiError> {
    let mut image: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        if name == "image" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;
            image = Some(bytes.to_vec());
        }
    }

    let image = match image {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            return Err(ApiError::BadRequest(
                "Missing 'image' field in upload".to_string(),
            ))
        }
    };

    tracing::debug!(bytes = image.len(), "Scan upload received");
    let outcome = ctx.core.scan(image).await?;
    Ok(Json(outcome))
}
