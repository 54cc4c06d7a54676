//! Statistics handlers

use axum::{extract::State, Json};
use rankup_service::dto::{MemberStatsResponse, ResetReport, StatAdjustRequest, StatAdjustResponse};
use rankup_service::ActivityService;

use crate::extractors::{CommandAuth, MemberIdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /commands/members/{member_id}/stats
pub async fn get_stats(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
) -> ApiResult<Json<MemberStatsResponse>> {
    let service = ActivityService::new(state.service_context());
    let stats = service.stats(member_id).await?;
    Ok(Json(stats))
}

/// Add to or remove from a member's counters
///
/// POST /commands/members/{member_id}/stats
pub async fn adjust_stats(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
    ValidatedJson(request): ValidatedJson<StatAdjustRequest>,
) -> ApiResult<Json<StatAdjustResponse>> {
    let service = ActivityService::new(state.service_context());
    let response = service.adjust(member_id, request).await?;
    Ok(Json(response))
}

/// Reset everyone's counters now; the schedule is not moved
///
/// POST /commands/reset
pub async fn force_reset(
    State(state): State<AppState>,
    _auth: CommandAuth,
) -> ApiResult<Json<ResetReport>> {
    let service = ActivityService::new(state.service_context());
    let report = service.force_reset().await?;
    Ok(Json(report))
}
