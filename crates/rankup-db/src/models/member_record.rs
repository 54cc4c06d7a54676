//! Member record database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for member_records table
#[derive(Debug, Clone, FromRow)]
pub struct MemberRecordModel {
    pub member_id: i64,
    pub message_count: i64,
    pub voice_minutes: i64,
    pub join_date: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_advance_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
