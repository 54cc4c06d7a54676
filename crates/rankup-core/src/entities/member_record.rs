//! Member record entity - a member's accumulated activity in the ledger

use chrono::{DateTime, Utc};

use crate::value_objects::{Snowflake, StatKind};

/// Ledger entry for one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub member_id: Snowflake,
    pub message_count: i64,
    pub voice_minutes: i64,
    pub join_date: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_advance_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberRecord {
    /// Create a fresh record with zeroed counters
    pub fn new(member_id: Snowflake, join_date: DateTime<Utc>) -> Self {
        Self {
            member_id,
            message_count: 0,
            voice_minutes: 0,
            join_date,
            last_message_at: None,
            last_advance_at: None,
            created_at: join_date,
            updated_at: join_date,
        }
    }

    /// Current value of a counter
    #[inline]
    pub fn stat(&self, kind: StatKind) -> i64 {
        match kind {
            StatKind::Messages => self.message_count,
            StatKind::VoiceMinutes => self.voice_minutes,
        }
    }

    /// Voice time in fractional hours
    pub fn voice_hours(&self) -> f64 {
        self.voice_minutes as f64 / 60.0
    }

    /// Apply a signed delta to a counter, clamping at zero
    pub fn apply(&mut self, kind: StatKind, delta: i64, at: DateTime<Utc>) {
        let slot = match kind {
            StatKind::Messages => &mut self.message_count,
            StatKind::VoiceMinutes => &mut self.voice_minutes,
        };
        *slot = slot.saturating_add(delta).max(0);
        if kind == StatKind::Messages && delta > 0 {
            self.last_message_at = Some(at);
        }
        self.updated_at = at;
    }

    /// Zero both counters (periodic reset). Cooldown state is kept.
    pub fn reset_counters(&mut self, at: DateTime<Utc>) {
        self.message_count = 0;
        self.voice_minutes = 0;
        self.updated_at = at;
    }

    /// Mark a successful rank advance
    pub fn mark_advanced(&mut self, at: DateTime<Utc>) {
        self.last_advance_at = Some(at);
        self.updated_at = at;
    }
}
