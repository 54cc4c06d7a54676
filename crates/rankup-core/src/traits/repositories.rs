//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{BlacklistEntry, MemberRecord, ResetSchedule, VoiceSession};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Activity Ledger
// ============================================================================

/// Durable per-member activity counters.
///
/// Every increment must be applied atomically by the store itself; callers
/// never read-modify-write counters.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Create the member's record if absent and return the stored record
    async fn ensure_member(
        &self,
        member_id: Snowflake,
        join_date: DateTime<Utc>,
    ) -> RepoResult<MemberRecord>;

    /// Add counted messages, set `last_message_at` and append history
    async fn add_messages(
        &self,
        member_id: Snowflake,
        delta: i64,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Add voice minutes without a session (operator adjustments)
    async fn add_voice_minutes(
        &self,
        member_id: Snowflake,
        delta: i64,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Subtract from a counter, failing with `InsufficientStats` when the
    /// member holds less than `amount`
    async fn remove_messages(&self, member_id: Snowflake, amount: i64) -> RepoResult<i64>;

    /// Voice counterpart of [`LedgerRepository::remove_messages`]
    async fn remove_voice_minutes(&self, member_id: Snowflake, amount: i64) -> RepoResult<i64>;

    /// Credit a closed session and store it as history in one transaction
    async fn credit_voice_session(&self, session: &VoiceSession) -> RepoResult<()>;

    /// Read a member's record
    async fn get_snapshot(&self, member_id: Snowflake) -> RepoResult<Option<MemberRecord>>;

    /// Stamp a successful rank advance
    async fn record_advance(&self, member_id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Zero every member's counters and drop all activity history.
    /// All-or-nothing; returns the number of member records touched.
    async fn reset_all(&self) -> RepoResult<u64>;
}

// ============================================================================
// Blacklist Repository
// ============================================================================

#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// Insert an entry; `AlreadyBlacklisted` if one exists
    async fn add(&self, entry: &BlacklistEntry) -> RepoResult<()>;

    /// Delete an entry; `NotBlacklisted` if none exists
    async fn remove(&self, member_id: Snowflake) -> RepoResult<()>;

    async fn find(&self, member_id: Snowflake) -> RepoResult<Option<BlacklistEntry>>;

    async fn is_blacklisted(&self, member_id: Snowflake) -> RepoResult<bool>;

    /// All entries, newest first
    async fn list(&self) -> RepoResult<Vec<BlacklistEntry>>;
}

// ============================================================================
// Reset Schedule Repository
// ============================================================================

#[async_trait]
pub trait ResetScheduleRepository: Send + Sync {
    /// Load the singleton schedule, if one was ever configured
    async fn load(&self) -> RepoResult<Option<ResetSchedule>>;

    /// Insert or replace the singleton schedule
    async fn save(&self, schedule: &ResetSchedule) -> RepoResult<()>;
}
