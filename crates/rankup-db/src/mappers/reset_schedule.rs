//! ResetSchedule entity <-> model mapper

use chrono::{DateTime, Utc};
use rankup_core::entities::ResetSchedule;

use crate::models::ResetScheduleModel;

impl From<ResetScheduleModel> for ResetSchedule {
    fn from(model: ResetScheduleModel) -> Self {
        ResetSchedule {
            next_reset_at: model.next_reset_at,
            interval_days: u32::try_from(model.interval_days).unwrap_or(1).max(1),
            updated_at: model.updated_at,
        }
    }
}

/// Values for the singleton upsert
pub struct ScheduleUpsert {
    pub next_reset_at: DateTime<Utc>,
    pub interval_days: i32,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleUpsert {
    pub fn new(schedule: &ResetSchedule) -> Self {
        Self {
            next_reset_at: schedule.next_reset_at,
            interval_days: i32::try_from(schedule.interval_days).unwrap_or(i32::MAX),
            updated_at: schedule.updated_at,
        }
    }
}
