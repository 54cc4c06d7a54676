//! # rankup-core
//!
//! Domain layer containing entities, value objects, the rank policy evaluator,
//! ports, and domain events. This crate has zero dependencies on
//! infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    credited_minutes, BlacklistEntry, MemberRecord, PermissionTier, RankDefinition, RankLadder,
    ResetSchedule, ScheduleCatchUp, ThresholdMode, VoiceSession,
};
pub use error::DomainError;
pub use events::{
    BlacklistChangedEvent, DomainEvent, RankChangedEvent, RanksClearedEvent, StatsResetEvent,
};
pub use policy::{evaluate, Eligibility, NextRankStatus, ThresholdProgress};
pub use traits::{
    BlacklistRepository, Clock, EventSink, LedgerRepository, RepoResult,
    ResetScheduleRepository, RoleGateway, SystemClock,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError, StatKind};
