//! Voice session tracker
//!
//! Keeps the open voice session of every member currently in a channel.
//! Open sessions live only in memory; a restart forgets them and the
//! affected stays are never credited.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use rankup_core::entities::VoiceSession;
use rankup_core::value_objects::{Snowflake, SnowflakeGenerator};

/// A voice-state change reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceStateChange {
    pub member_id: Snowflake,
    pub old_channel: Option<Snowflake>,
    pub new_channel: Option<Snowflake>,
    pub at: DateTime<Utc>,
}

impl VoiceStateChange {
    /// Mute, deafen and stream toggles keep the channel unchanged
    pub fn is_same_channel(&self) -> bool {
        self.old_channel == self.new_channel
    }
}

/// What the tracker did with a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceTransition {
    /// A session was opened and none was closed
    Opened,
    /// The open session was closed and nothing replaced it
    Closed(VoiceSession),
    /// The open session was closed and a new one opened at the same instant
    Reopened(VoiceSession),
    /// A leave arrived for a member with no open session
    Untracked,
    /// Channel did not change, or the member may not open a session
    Unchanged,
}

impl VoiceTransition {
    /// Session that must be credited, if any
    pub fn closed_session(&self) -> Option<&VoiceSession> {
        match self {
            Self::Closed(session) | Self::Reopened(session) => Some(session),
            _ => None,
        }
    }
}

/// Per-member voice session state machine
#[derive(Debug, Default)]
pub struct VoiceTracker {
    sessions: DashMap<Snowflake, VoiceSession>,
}

impl VoiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a voice-state change.
    ///
    /// `may_open` decides whether a new session is opened for the target
    /// channel. Closing an existing session never depends on it, so a
    /// member who loses their ranking roles mid-stay is still credited.
    pub fn apply(
        &self,
        change: &VoiceStateChange,
        min_session: Duration,
        ids: &SnowflakeGenerator,
        may_open: bool,
    ) -> VoiceTransition {
        if change.is_same_channel() {
            return VoiceTransition::Unchanged;
        }

        let member_id = change.member_id;
        let replaced = match change.new_channel {
            Some(channel_id) if may_open => {
                let session = VoiceSession::open(ids.generate(), member_id, channel_id, change.at);
                self.sessions.insert(member_id, session)
            }
            _ => self.sessions.remove(&member_id).map(|(_, session)| session),
        };

        match (replaced, change.new_channel.is_some() && may_open) {
            (Some(mut session), true) => {
                session.close(change.at, min_session);
                VoiceTransition::Reopened(session)
            }
            (Some(mut session), false) => {
                session.close(change.at, min_session);
                VoiceTransition::Closed(session)
            }
            (None, true) => VoiceTransition::Opened,
            (None, false) if change.new_channel.is_none() => VoiceTransition::Untracked,
            (None, false) => VoiceTransition::Unchanged,
        }
    }

    /// Open session of a member, if any
    pub fn open_session(&self, member_id: Snowflake) -> Option<VoiceSession> {
        self.sessions.get(&member_id).map(|entry| entry.clone())
    }

    pub fn open_count(&self) -> usize {
        self.sessions.len()
    }

    /// Forget every open session
    pub fn clear(&self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        count
    }
}
