//! Blacklist handlers

use axum::{extract::State, Json};
use rankup_service::dto::{BlacklistEntryResponse, BlacklistRequest};
use rankup_service::BlacklistService;

use crate::extractors::{CommandAuth, MemberIdPath, OptionalValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /commands/blacklist
pub async fn list_blacklist(
    State(state): State<AppState>,
    _auth: CommandAuth,
) -> ApiResult<Json<Vec<BlacklistEntryResponse>>> {
    let service = BlacklistService::new(state.service_context());
    let entries = service.list().await?;
    Ok(Json(entries))
}

/// GET /commands/blacklist/{member_id}
pub async fn get_entry(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
) -> ApiResult<Json<BlacklistEntryResponse>> {
    let service = BlacklistService::new(state.service_context());
    let entry = service.get(member_id).await?;
    Ok(Json(entry))
}

/// Blacklist a member; the body (reason, issuer) is optional
///
/// PUT /commands/blacklist/{member_id}
pub async fn add_to_blacklist(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
    OptionalValidatedJson(request): OptionalValidatedJson<BlacklistRequest>,
) -> ApiResult<Created<Json<BlacklistEntryResponse>>> {
    let service = BlacklistService::new(state.service_context());
    let entry = service
        .add(member_id, request.unwrap_or_default())
        .await?;
    Ok(Created(Json(entry)))
}

/// DELETE /commands/blacklist/{member_id}
pub async fn remove_from_blacklist(
    State(state): State<AppState>,
    _auth: CommandAuth,
    MemberIdPath(member_id): MemberIdPath,
    OptionalValidatedJson(request): OptionalValidatedJson<BlacklistRequest>,
) -> ApiResult<NoContent> {
    let service = BlacklistService::new(state.service_context());
    let issued_by = request.and_then(|r| r.issued_by);
    service.remove(member_id, issued_by).await?;
    Ok(NoContent)
}
