//! Data transfer objects for events, commands and responses
//!
//! This module provides:
//! - Request DTOs with validation for inbound events and commands
//! - Response DTOs for serializing outcomes
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    BlacklistRequest, MemberRolesEvent, MessageEvent, ScheduleRequest, StatAdjustRequest,
    StatOperation, VoiceStateEvent,
};

pub use responses::{
    ActivityOutcome, AdvanceOutcome, BlacklistEntryResponse, DerankAllOutcome,
    DerankOutcome, HealthResponse, IgnoreReason, MemberStatsResponse, RankSummary,
    RankViewResponse, ResetReport, RoleFailure, RoleSyncOutcome, ScheduleResponse,
    StatAdjustResponse,
};
