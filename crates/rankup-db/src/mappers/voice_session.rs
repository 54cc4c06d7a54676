//! VoiceSession entity <-> model mapper

use chrono::{DateTime, Utc};
use rankup_core::entities::VoiceSession;
use rankup_core::value_objects::Snowflake;

use crate::models::VoiceSessionModel;

impl From<VoiceSessionModel> for VoiceSession {
    fn from(model: VoiceSessionModel) -> Self {
        VoiceSession {
            session_id: Snowflake::new(model.session_id),
            member_id: Snowflake::new(model.member_id),
            channel_id: Snowflake::new(model.channel_id),
            join_time: model.join_time,
            leave_time: Some(model.leave_time),
            duration_minutes: model.duration_minutes,
        }
    }
}

/// Values for a voice_sessions history row
pub struct VoiceSessionInsert {
    pub session_id: i64,
    pub member_id: i64,
    pub channel_id: i64,
    pub join_time: DateTime<Utc>,
    pub leave_time: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl VoiceSessionInsert {
    /// `None` for a session that is still open
    pub fn new(session: &VoiceSession) -> Option<Self> {
        Some(Self {
            session_id: session.session_id.into_inner(),
            member_id: session.member_id.into_inner(),
            channel_id: session.channel_id.into_inner(),
            join_time: session.join_time,
            leave_time: session.leave_time?,
            duration_minutes: session.duration_minutes.max(0),
        })
    }
}
