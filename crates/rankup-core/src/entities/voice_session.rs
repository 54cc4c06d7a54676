//! Voice session entity - one continuous stay in a voice channel

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::Snowflake;

/// A voice session. Open while `leave_time` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSession {
    pub session_id: Snowflake,
    pub member_id: Snowflake,
    pub channel_id: Snowflake,
    pub join_time: DateTime<Utc>,
    pub leave_time: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
}

impl VoiceSession {
    /// Open a new session at `join_time`
    pub fn open(
        session_id: Snowflake,
        member_id: Snowflake,
        channel_id: Snowflake,
        join_time: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            member_id,
            channel_id,
            join_time,
            leave_time: None,
            duration_minutes: 0,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.leave_time.is_none()
    }

    /// Close the session and compute the credited minutes.
    ///
    /// Closing an already closed session is a no-op and returns the
    /// previously credited amount.
    pub fn close(&mut self, leave_time: DateTime<Utc>, min_session: Duration) -> i64 {
        if self.is_open() {
            self.duration_minutes = credited_minutes(self.join_time, leave_time, min_session);
            self.leave_time = Some(leave_time);
        }
        self.duration_minutes
    }
}

/// Whole minutes credited for a stay from `join` to `leave`.
///
/// Partial minutes are truncated. Stays shorter than `min_session`, and
/// stays whose leave precedes the join, credit nothing.
pub fn credited_minutes(join: DateTime<Utc>, leave: DateTime<Utc>, min_session: Duration) -> i64 {
    let elapsed = leave - join;
    if elapsed < min_session || elapsed <= Duration::zero() {
        return 0;
    }
    elapsed.num_milliseconds() / 60_000
}
