//! Platform event handlers
//!
//! These never fail on domain grounds: the outcome body says whether the
//! event was counted, ignored or dropped.

use axum::{extract::State, Json};
use rankup_service::dto::{
    ActivityOutcome, MemberRolesEvent, MessageEvent, RoleSyncOutcome, VoiceStateEvent,
};
use rankup_service::{ActivityService, RoleSyncService};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /events/message
pub async fn message_created(
    State(state): State<AppState>,
    ValidatedJson(event): ValidatedJson<MessageEvent>,
) -> Json<ActivityOutcome> {
    let service = ActivityService::new(state.service_context());
    Json(service.on_message(event).await)
}

/// POST /events/voice-state
pub async fn voice_state_updated(
    State(state): State<AppState>,
    ValidatedJson(event): ValidatedJson<VoiceStateEvent>,
) -> Json<ActivityOutcome> {
    let service = ActivityService::new(state.service_context());
    Json(service.on_voice_state_change(event).await)
}

/// POST /events/member-roles
pub async fn member_roles_updated(
    State(state): State<AppState>,
    ValidatedJson(event): ValidatedJson<MemberRolesEvent>,
) -> Json<RoleSyncOutcome> {
    let service = RoleSyncService::new(state.service_context());
    Json(service.on_roles_changed(event).await)
}
