//! Domain events - events emitted when domain state changes
//!
//! These events are used for:
//! - Announcing periodic resets in the community
//! - Audit logging of rank changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Reset Events
    // =========================================================================
    StatsReset(StatsResetEvent),

    // =========================================================================
    // Rank Events
    // =========================================================================
    RankAdvanced(RankChangedEvent),
    RankLowered(RankChangedEvent),
    RanksCleared(RanksClearedEvent),

    // =========================================================================
    // Blacklist Events
    // =========================================================================
    MemberBlacklisted(BlacklistChangedEvent),
    MemberUnblacklisted(BlacklistChangedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StatsReset(_) => "STATS_RESET",
            Self::RankAdvanced(_) => "RANK_ADVANCED",
            Self::RankLowered(_) => "RANK_LOWERED",
            Self::RanksCleared(_) => "RANKS_CLEARED",
            Self::MemberBlacklisted(_) => "MEMBER_BLACKLISTED",
            Self::MemberUnblacklisted(_) => "MEMBER_UNBLACKLISTED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::StatsReset(e) => e.timestamp,
            Self::RankAdvanced(e) | Self::RankLowered(e) => e.timestamp,
            Self::RanksCleared(e) => e.timestamp,
            Self::MemberBlacklisted(e) | Self::MemberUnblacklisted(e) => e.timestamp,
        }
    }

    /// Member concerned by the event, if any
    pub fn member_id(&self) -> Option<Snowflake> {
        match self {
            Self::StatsReset(_) => None,
            Self::RankAdvanced(e) | Self::RankLowered(e) => Some(e.member_id),
            Self::RanksCleared(e) => Some(e.member_id),
            Self::MemberBlacklisted(e) | Self::MemberUnblacklisted(e) => Some(e.member_id),
        }
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResetEvent {
    pub affected_members: u64,
    /// Boundary that fired, or `None` for an operator-forced reset
    pub boundary: Option<DateTime<Utc>>,
    pub next_reset_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankChangedEvent {
    pub member_id: Snowflake,
    pub from_rank: usize,
    pub to_rank: usize,
    pub rank_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RanksClearedEvent {
    pub member_id: Snowflake,
    pub removed_roles: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistChangedEvent {
    pub member_id: Snowflake,
    pub issued_by: Option<Snowflake>,
    pub timestamp: DateTime<Utc>,
}
