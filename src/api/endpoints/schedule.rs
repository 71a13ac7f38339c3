//! Daily schedule endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::schedule::ScheduleEntry;

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub entries: Vec<ScheduleEntry>,
}

/// `GET /api/schedule` — today's dose checklist, morning slots first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<ScheduleResponse>, ApiError> {
    let entries = ctx.core.schedule_entries()?;
    Ok(Json(ScheduleResponse { entries }))
}

/// `POST /api/schedule/:entry_id/toggle` — flip one taken checkmark.
pub async fn toggle(
    State(ctx): State<ApiContext>,
    Path(entry_id): Path<String>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let entry = ctx.core.toggle_schedule_entry(&entry_id)?;
    Ok(Json(entry))
}
