//! Request DTOs for platform events and command routes
//!
//! All request DTOs implement `Deserialize`; those carrying operator input
//! also implement `Validate`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use rankup_core::value_objects::{Snowflake, StatKind};

// ============================================================================
// Platform Events
// ============================================================================

/// A message was posted in the community
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessageEvent {
    pub member_id: Snowflake,

    #[serde(default)]
    pub is_bot: bool,

    /// Direct messages never count
    #[serde(default)]
    pub is_direct: bool,

    #[validate(length(max = 4000, message = "Content must be at most 4000 characters"))]
    pub content: Option<String>,

    /// Role set at the time of the event; fetched from the platform when absent
    pub roles: Option<HashSet<Snowflake>>,

    /// When the member joined the community
    pub joined_at: Option<DateTime<Utc>>,

    /// Event time; the service clock is used when absent
    pub at: Option<DateTime<Utc>>,
}

impl MessageEvent {
    /// Slash-command invocations are not activity
    pub fn is_command(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|content| content.trim_start().starts_with('/'))
    }
}

/// A member joined, left or moved between voice channels
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VoiceStateEvent {
    pub member_id: Snowflake,

    #[serde(default)]
    pub is_bot: bool,

    pub old_channel_id: Option<Snowflake>,
    pub new_channel_id: Option<Snowflake>,

    pub roles: Option<HashSet<Snowflake>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub at: Option<DateTime<Utc>>,
}

/// A member's role set changed
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MemberRolesEvent {
    pub member_id: Snowflake,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub old_roles: HashSet<Snowflake>,

    pub new_roles: HashSet<Snowflake>,
}

impl MemberRolesEvent {
    /// Roles present after the update but not before
    pub fn added_roles(&self) -> impl Iterator<Item = Snowflake> + '_ {
        self.new_roles
            .iter()
            .copied()
            .filter(|role| !self.old_roles.contains(role))
    }
}

// ============================================================================
// Command Requests
// ============================================================================

/// Direction of an operator stat adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatOperation {
    Add,
    Remove,
}

/// Operator stat adjustment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatAdjustRequest {
    pub operation: StatOperation,

    pub kind: StatKind,

    #[validate(range(min = 1, message = "Amount must be at least 1"))]
    pub amount: i64,
}

/// Add a member to the blacklist
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BlacklistRequest {
    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,

    /// Operator issuing the entry
    pub issued_by: Option<Snowflake>,
}

/// Set or change the reset schedule
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleRequest {
    /// RFC 3339 timestamp or `DD-MM` (next occurrence at 00:00 UTC)
    #[validate(length(min = 1, max = 64, message = "First boundary must be 1-64 characters"))]
    pub first_boundary: String,

    #[validate(range(min = 1, max = 365, message = "Interval must be 1-365 days"))]
    pub interval_days: Option<u32>,
}
