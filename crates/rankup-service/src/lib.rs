//! # rankup-service
//!
//! Application layer: turns platform events into ledger updates, evaluates
//! and performs rank advances, and runs the periodic statistics reset.

pub mod dto;
pub mod services;
pub mod tracking;

pub use services::{
    domain_status, ActivityService, AdvancementService, BlacklistService, RankService, RankSettings,
    ResetScheduler, RoleSyncService, SchedulerConfig, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
pub use tracking::{TrackingState, VoiceStateChange, VoiceTracker, VoiceTransition};
