//! Reset schedule entity - the persisted boundary of the next global reset

use chrono::{DateTime, Duration, Utc};

/// Default cadence between resets
pub const DEFAULT_INTERVAL_DAYS: u32 = 14;

/// Singleton schedule state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSchedule {
    pub next_reset_at: DateTime<Utc>,
    pub interval_days: u32,
    pub updated_at: DateTime<Utc>,
}

/// Result of moving a stale boundary forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCatchUp {
    pub next_reset_at: DateTime<Utc>,
    /// Boundaries that passed while nothing was running
    pub skipped: i64,
}

impl ResetSchedule {
    pub fn new(next_reset_at: DateTime<Utc>, interval_days: u32, at: DateTime<Utc>) -> Self {
        Self {
            next_reset_at,
            interval_days: interval_days.max(1),
            updated_at: at,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::days(i64::from(self.interval_days.max(1)))
    }

    /// The boundary following the current one
    pub fn following_boundary(&self) -> DateTime<Utc> {
        self.next_reset_at + self.interval()
    }

    /// Whether the boundary has been reached at `now`
    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_reset_at <= now
    }

    /// Move the boundary forward by the smallest whole number of intervals
    /// that leaves it strictly after `now`. A boundary already in the future
    /// is returned unchanged with `skipped == 0`.
    pub fn catch_up(&self, now: DateTime<Utc>) -> ScheduleCatchUp {
        if !self.is_due(now) {
            return ScheduleCatchUp {
                next_reset_at: self.next_reset_at,
                skipped: 0,
            };
        }

        let interval_ms = self.interval().num_milliseconds();
        let behind_ms = (now - self.next_reset_at).num_milliseconds();
        let steps = behind_ms / interval_ms + 1;

        ScheduleCatchUp {
            next_reset_at: self.next_reset_at + Duration::milliseconds(interval_ms * steps),
            skipped: steps,
        }
    }

    /// Schedule after a fired reset: the boundary moves by exactly one interval
    pub fn advanced(&self, at: DateTime<Utc>) -> Self {
        Self {
            next_reset_at: self.following_boundary(),
            interval_days: self.interval_days,
            updated_at: at,
        }
    }
}
