//! Voice session history model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for voice_sessions table (closed sessions only)
#[derive(Debug, Clone, FromRow)]
pub struct VoiceSessionModel {
    pub session_id: i64,
    pub member_id: i64,
    pub channel_id: i64,
    pub join_time: DateTime<Utc>,
    pub leave_time: DateTime<Utc>,
    pub duration_minutes: i64,
}
