//! Reset schedule handlers

use axum::{extract::State, Json};
use rankup_service::dto::{ScheduleRequest, ScheduleResponse};

use crate::extractors::{CommandAuth, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /commands/schedule
pub async fn get_schedule(
    State(state): State<AppState>,
    _auth: CommandAuth,
) -> ApiResult<Json<ScheduleResponse>> {
    let schedule = state.scheduler().current().await?;
    Ok(Json(schedule))
}

/// Set the next boundary (RFC 3339 or `DD-MM`) and optionally the interval
///
/// PUT /commands/schedule
pub async fn set_schedule(
    State(state): State<AppState>,
    _auth: CommandAuth,
    ValidatedJson(request): ValidatedJson<ScheduleRequest>,
) -> ApiResult<Json<ScheduleResponse>> {
    let schedule = state.scheduler().configure_from_request(request).await?;
    Ok(Json(schedule))
}
