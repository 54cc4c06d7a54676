//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Advancement Outcomes
    // =========================================================================
    #[error("Member {0} has no ledger entry yet")]
    MemberNotRegistered(Snowflake),

    #[error("Member {0} is blacklisted from the rank system")]
    MemberBlacklisted(Snowflake),

    #[error("Rank advance on cooldown for another {remaining_secs}s")]
    OnCooldown { remaining_secs: i64 },

    #[error(
        "Requirements not met: {remaining_messages} messages and {remaining_voice_minutes} voice minutes remaining"
    )]
    RequirementsNotMet {
        remaining_messages: i64,
        remaining_voice_minutes: i64,
    },

    #[error("Already at the highest rank")]
    AlreadyMaxRank,

    #[error("Already at the lowest rank")]
    AlreadyLowestRank,

    #[error("Member holds no rank roles")]
    NoRankRoles,

    // =========================================================================
    // Blacklist / Stats
    // =========================================================================
    #[error("Member {0} is already blacklisted")]
    AlreadyBlacklisted(Snowflake),

    #[error("Member {0} is not blacklisted")]
    NotBlacklisted(Snowflake),

    #[error("Cannot remove {requested}: member only has {available}")]
    InsufficientStats { available: i64, requested: i64 },

    // =========================================================================
    // Configuration
    // =========================================================================
    #[error("Reset schedule has not been configured")]
    ScheduleNotConfigured,

    #[error("Invalid rank ladder: {0}")]
    InvalidLadder(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Role side effect failed: {0}")]
    RoleSideEffect(String),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberNotRegistered(_) => "NOT_REGISTERED",
            Self::MemberBlacklisted(_) => "BLACKLISTED",
            Self::OnCooldown { .. } => "ON_COOLDOWN",
            Self::RequirementsNotMet { .. } => "REQUIREMENTS_NOT_MET",
            Self::AlreadyMaxRank => "ALREADY_MAX_RANK",
            Self::AlreadyLowestRank => "ALREADY_LOWEST_RANK",
            Self::NoRankRoles => "NO_RANK_ROLES",

            Self::AlreadyBlacklisted(_) => "ALREADY_BLACKLISTED",
            Self::NotBlacklisted(_) => "NOT_BLACKLISTED",
            Self::InsufficientStats { .. } => "INSUFFICIENT_STATS",

            Self::ScheduleNotConfigured => "SCHEDULE_NOT_CONFIGURED",
            Self::InvalidLadder(_) => "INVALID_LADDER",
            Self::ValidationError(_) => "VALIDATION_ERROR",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::RoleSideEffect(_) => "ROLE_SIDE_EFFECT_FAILED",
            Self::PlatformError(_) => "PLATFORM_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MemberNotRegistered(_) | Self::NotBlacklisted(_) | Self::ScheduleNotConfigured
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidLadder(_) | Self::InsufficientStats { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MemberBlacklisted(_))
    }

    /// Check if this is a conflict error (state does not allow the operation right now)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::OnCooldown { .. }
                | Self::RequirementsNotMet { .. }
                | Self::AlreadyMaxRank
                | Self::AlreadyLowestRank
                | Self::NoRankRoles
                | Self::AlreadyBlacklisted(_)
        )
    }

    /// Infrastructure faults that may succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::RoleSideEffect(_) | Self::PlatformError(_)
        )
    }
}
