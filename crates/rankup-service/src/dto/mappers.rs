//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use rankup_core::entities::{BlacklistEntry, MemberRecord, RankLadder, ResetSchedule};

use super::responses::{
    BlacklistEntryResponse, MemberStatsResponse, RankSummary, ScheduleResponse,
};

impl From<&MemberRecord> for MemberStatsResponse {
    fn from(record: &MemberRecord) -> Self {
        Self {
            member_id: record.member_id,
            message_count: record.message_count,
            voice_minutes: record.voice_minutes,
            join_date: record.join_date,
            last_message_at: record.last_message_at,
        }
    }
}

impl From<BlacklistEntry> for BlacklistEntryResponse {
    fn from(entry: BlacklistEntry) -> Self {
        Self {
            member_id: entry.member_id,
            reason: entry.reason,
            issued_by: entry.issued_by,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl From<&ResetSchedule> for ScheduleResponse {
    fn from(schedule: &ResetSchedule) -> Self {
        Self {
            next_reset_at: schedule.next_reset_at,
            interval_days: schedule.interval_days,
            updated_at: schedule.updated_at,
        }
    }
}

impl RankSummary {
    /// Summary of the rung at `index`, if the ladder has one
    pub fn of(ladder: &RankLadder, index: usize) -> Option<Self> {
        ladder.get(index).map(|rank| Self {
            index,
            name: rank.name.clone(),
            role_id: rank.role_id,
            permission_role_id: ladder.permission_role_for(index),
        })
    }
}
