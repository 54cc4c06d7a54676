//! Reset schedule database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the reset_schedule singleton row
#[derive(Debug, Clone, FromRow)]
pub struct ResetScheduleModel {
    pub next_reset_at: DateTime<Utc>,
    pub interval_days: i32,
    pub updated_at: DateTime<Utc>,
}
