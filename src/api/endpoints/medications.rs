//! Medication list endpoints.
//!
//! Two endpoints:
//! - `GET /api/medications` — the full list
//! - `POST /api/medications` — add a confirmed scan candidate

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{CandidateRecord, MedicationRecord};

#[derive(Serialize)]
pub struct MedicationsResponse {
    pub medications: Vec<MedicationRecord>,
    pub last_updated: String,
}

/// `GET /api/medications` — every stored prescription, insertion order.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<MedicationsResponse>, ApiError> {
    let medications = ctx.core.medications()?;

    Ok(Json(MedicationsResponse {
        medications,
        last_updated: chrono::Utc::now().to_rfc3339(),
    }))
}

/// `POST /api/medications` — persist a candidate the user confirmed.
///
/// Responds 201 with the stored record, fresh id and zero refills
/// included. A blank name is the one rejected input.
pub async fn add(
    State(ctx): State<ApiContext>,
    Json(candidate): Json<CandidateRecord>,
) -> Result<(StatusCode, Json<MedicationRecord>), ApiError> {
    let record = ctx.core.add_medication(candidate)?;
    Ok((StatusCode::CREATED, Json(record)))
}
