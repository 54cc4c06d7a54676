//! Rank bot services
//!
//! This module contains the service layer: activity bookkeeping, rank
//! evaluation and advancement, blacklist management, role sync and the
//! periodic reset scheduler.

pub mod activity;
pub mod advancement;
pub mod blacklist;
pub mod context;
pub mod error;
pub mod rank;
pub mod role_sync;
pub mod scheduler;

// Re-export all services for convenience
pub use activity::ActivityService;
pub use advancement::{AdvancementService, RolePlan};
pub use blacklist::BlacklistService;
pub use context::{RankSettings, ServiceContext, ServiceContextBuilder};
pub use error::{domain_status, ServiceError, ServiceResult};
pub use rank::RankService;
pub use role_sync::RoleSyncService;
pub use scheduler::{ResetScheduler, SchedulerConfig};
