//! Response DTOs for command routes and event handlers
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rankup_core::policy::NextRankStatus;
use rankup_core::value_objects::{Snowflake, StatKind};

// ============================================================================
// Common Response Types
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Activity
// ============================================================================

/// Why an inbound event did not change the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    Bot,
    DirectMessage,
    Command,
    NotRankingMember,
    RateLimited,
    SameChannel,
    NoOpenSession,
}

/// Result of handling one platform event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActivityOutcome {
    /// One message was counted
    Counted,
    /// A voice session was opened
    SessionOpened,
    /// A voice session was closed and credited
    SessionClosed { credited_minutes: i64 },
    /// A voice session was closed and credited, and a new one opened
    SessionMoved { credited_minutes: i64 },
    Ignored { reason: IgnoreReason },
    /// A port failed; the event was logged and dropped
    Dropped,
}

impl ActivityOutcome {
    pub const fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }
}

/// Ledger counters of one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStatsResponse {
    pub member_id: Snowflake,
    pub message_count: i64,
    pub voice_minutes: i64,
    pub join_date: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Result of an operator stat adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatAdjustResponse {
    pub member_id: Snowflake,
    pub kind: StatKind,
    pub amount: i64,
    pub stats: MemberStatsResponse,
}

/// Result of a global statistics reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub affected_members: u64,
    /// Boundary that fired; `None` for an operator-forced reset
    pub boundary: Option<DateTime<Utc>>,
    pub next_reset_at: Option<DateTime<Utc>>,
    pub reset_at: DateTime<Utc>,
}

// ============================================================================
// Ranks
// ============================================================================

/// One ladder rung as shown to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankSummary {
    pub index: usize,
    pub name: String,
    pub role_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_role_id: Option<Snowflake>,
}

/// Ledger snapshot, current rank and progress towards the next one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankViewResponse {
    pub member_id: Snowflake,
    pub message_count: i64,
    pub voice_minutes: i64,
    pub voice_hours: f64,
    pub join_date: DateTime<Utc>,
    pub last_advance_at: Option<DateTime<Utc>>,
    /// `None` when the member holds no rank role
    pub current_rank: Option<RankSummary>,
    pub next_rank: Option<NextRankStatus>,
    pub is_max_rank: bool,
    pub on_cooldown: bool,
    pub cooldown_remaining_secs: i64,
    pub overall_percent: f64,
    pub can_advance: bool,
    pub blacklisted: bool,
}

/// A role mutation that failed without aborting the operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleFailure {
    pub role_id: Snowflake,
    pub error: String,
}

/// Successful rank advance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceOutcome {
    pub member_id: Snowflake,
    pub from_rank: usize,
    pub to_rank: usize,
    pub rank_name: String,
    /// The member held no rank role and was given the entry role first
    pub entry_role_assigned: bool,
    pub granted_roles: Vec<Snowflake>,
    pub revoked_roles: Vec<Snowflake>,
    /// Secondary grants and revocations that failed and need manual repair
    pub role_failures: Vec<RoleFailure>,
    pub advanced_at: DateTime<Utc>,
}

/// Successful one-rung derank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerankOutcome {
    pub member_id: Snowflake,
    pub from_rank: usize,
    pub to_rank: usize,
    pub rank_name: String,
    pub granted_roles: Vec<Snowflake>,
    pub revoked_roles: Vec<Snowflake>,
    pub role_failures: Vec<RoleFailure>,
}

/// Every rank and permission role removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerankAllOutcome {
    pub member_id: Snowflake,
    pub removed_roles: Vec<Snowflake>,
    pub role_failures: Vec<RoleFailure>,
}

/// Permission roles granted after a role update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSyncOutcome {
    pub granted_roles: Vec<Snowflake>,
    pub role_failures: Vec<RoleFailure>,
}

// ============================================================================
// Blacklist / Schedule
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlacklistEntryResponse {
    pub member_id: Snowflake,
    pub reason: Option<String>,
    pub issued_by: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleResponse {
    pub next_reset_at: DateTime<Utc>,
    pub interval_days: u32,
    pub updated_at: DateTime<Utc>,
}
