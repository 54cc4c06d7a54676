//! Rank handlers
//!
//! Rank view, advance and the two derank commands.

use axum::{extract::State, Json};
use rankup_service::dto::{AdvanceOutcome, DerankAllOutcome, DerankOutcome, RankViewResponse};
use rankup_service::{AdvancementService, RankService};

use crate::extractors::{CommandAuth, MemberIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Progress of a member towards the next rank
///
/// GET /commands/members/{member_id}/rank
pub async fn get_rank(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
) -> ApiResult<Json<RankViewResponse>> {
    let service = RankService::new(state.service_context());
    let view = service.rank_view(member_id).await?;
    Ok(Json(view))
}

/// Attempt a rank advance
///
/// POST /commands/members/{member_id}/advance
pub async fn advance(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
) -> ApiResult<Json<AdvanceOutcome>> {
    let service = AdvancementService::new(state.service_context());
    let outcome = service.attempt_advance(member_id).await?;
    Ok(Json(outcome))
}

/// Move a member one rung down
///
/// POST /commands/members/{member_id}/derank
pub async fn derank(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
) -> ApiResult<Json<DerankOutcome>> {
    let service = AdvancementService::new(state.service_context());
    let outcome = service.derank(member_id).await?;
    Ok(Json(outcome))
}

/// Strip every rank and permission role
///
/// POST /commands/members/{member_id}/derank-all
pub async fn derank_all(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
) -> ApiResult<Json<DerankAllOutcome>> {
    let service = AdvancementService::new(state.service_context());
    let outcome = service.derank_all(member_id).await?;
    Ok(Json(outcome))
}
