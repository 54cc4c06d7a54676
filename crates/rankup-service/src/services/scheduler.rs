//! Reset scheduler
//!
//! Fires the ledger-wide reset on a recurring boundary. The boundary is
//! persisted, so a restart resumes from the stored schedule. Boundaries
//! that passed while the process was down are skipped, not replayed.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use rankup_common::{parse_first_boundary, ResetConfig};
use rankup_core::entities::ResetSchedule;
use rankup_core::error::DomainError;
use rankup_core::events::{DomainEvent, StatsResetEvent};

use crate::dto::{ResetReport, ScheduleRequest, ScheduleResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Configuration for the reset scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Interval used when creating a schedule without an explicit one
    pub interval_days: u32,
    /// Seeds the schedule when none is stored
    pub first_boundary: Option<DateTime<Utc>>,
    /// Delay before retrying a failed reset of the same boundary
    pub retry_backoff: StdDuration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&ResetConfig::default())
    }
}

impl From<&ResetConfig> for SchedulerConfig {
    fn from(config: &ResetConfig) -> Self {
        Self {
            interval_days: config.interval_days.max(1),
            first_boundary: config.first_boundary,
            retry_backoff: config.retry_backoff(),
        }
    }
}

/// Periodic statistics reset
///
/// At most one timer task exists per scheduler; arming again aborts the
/// previous one. Every write to the stored schedule happens under
/// `schedule_write`, so a timer that is already past its boundary cannot
/// overwrite a schedule the operator sets meanwhile.
pub struct ResetScheduler {
    ctx: ServiceContext,
    config: SchedulerConfig,
    task: Mutex<Option<JoinHandle<()>>>,
    schedule_write: tokio::sync::Mutex<()>,
}

impl ResetScheduler {
    pub fn new(ctx: ServiceContext, config: SchedulerConfig) -> Self {
        Self {
            ctx,
            config,
            task: Mutex::new(None),
            schedule_write: tokio::sync::Mutex::new(()),
        }
    }

    pub fn new_shared(ctx: ServiceContext, config: SchedulerConfig) -> Arc<Self> {
        Arc::new(Self::new(ctx, config))
    }

    /// Load the schedule and bring a stale boundary forward.
    ///
    /// Returns `None` when nothing is stored and no first boundary is
    /// configured.
    #[instrument(skip(self))]
    pub async fn resolve_boundary(&self, now: DateTime<Utc>) -> ServiceResult<Option<ResetSchedule>> {
        let _write = self.schedule_write.lock().await;
        let repo = self.ctx.schedule_repo();

        let schedule = match repo.load().await? {
            Some(schedule) => schedule,
            None => match self.config.first_boundary {
                Some(first) => {
                    let schedule = ResetSchedule::new(first, self.config.interval_days, now);
                    repo.save(&schedule).await?;
                    info!(first_boundary = %first, "Reset schedule seeded from configuration");
                    schedule
                }
                None => return Ok(None),
            },
        };

        if !schedule.is_due(now) {
            return Ok(Some(schedule));
        }

        let catch_up = schedule.catch_up(now);
        let moved = ResetSchedule::new(catch_up.next_reset_at, schedule.interval_days, now);
        repo.save(&moved).await?;

        warn!(
            stale_boundary = %schedule.next_reset_at,
            next_reset_at = %moved.next_reset_at,
            skipped = catch_up.skipped,
            "Reset boundaries passed while stopped, moved to the next one"
        );

        Ok(Some(moved))
    }

    /// Arm the timer. Equivalent to [`ResetScheduler::rearm`].
    pub fn start(self: &Arc<Self>) {
        self.rearm();
    }

    /// Abort any running timer and spawn a fresh one
    pub fn rearm(self: &Arc<Self>) {
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move { scheduler.run().await });

        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the timer. Safe to call repeatedly.
    pub fn cancel(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            info!("Reset scheduler cancelled");
        }
    }

    /// Whether a timer task is alive
    pub fn is_armed(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn run(self: Arc<Self>) {
        loop {
            let schedule = match self.resolve_boundary(self.ctx.now()).await {
                Ok(Some(schedule)) => schedule,
                Ok(None) => {
                    info!("No reset schedule configured, scheduler idle");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "Could not load reset schedule, retrying");
                    tokio::time::sleep(self.config.retry_backoff).await;
                    continue;
                }
            };

            let wait = (schedule.next_reset_at - self.ctx.now())
                .to_std()
                .unwrap_or_default();
            info!(
                next_reset_at = %schedule.next_reset_at,
                wait_secs = wait.as_secs(),
                "Next statistics reset scheduled"
            );
            tokio::time::sleep(wait).await;

            while let Err(e) = self.fire(&schedule).await {
                warn!(
                    boundary = %schedule.next_reset_at,
                    retry_in_secs = self.config.retry_backoff.as_secs(),
                    error = %e,
                    "Scheduled reset failed, retrying the same boundary"
                );
                tokio::time::sleep(self.config.retry_backoff).await;
            }
        }
    }

    /// Reset every counter for `schedule`'s boundary, persist the next
    /// boundary, then announce.
    ///
    /// A failed reset leaves the schedule untouched. A failed save after a
    /// successful reset is logged; the next resolve moves the stale
    /// boundary forward without resetting twice.
    #[instrument(skip(self, schedule), fields(boundary = %schedule.next_reset_at))]
    pub async fn fire(&self, schedule: &ResetSchedule) -> ServiceResult<ResetReport> {
        let _write = self.schedule_write.lock().await;
        let boundary = schedule.next_reset_at;
        let affected_members = self.ctx.ledger_repo().reset_all().await.map_err(|e| {
            error!(boundary = %boundary, error = %e, "Statistics reset rolled back");
            e
        })?;

        let reset_at = self.ctx.now();
        let next = schedule.advanced(reset_at);
        if let Err(e) = self.ctx.schedule_repo().save(&next).await {
            error!(
                boundary = %boundary,
                next_reset_at = %next.next_reset_at,
                error = %e,
                "Reset done but the next boundary was not saved"
            );
        }

        info!(
            affected_members,
            boundary = %boundary,
            next_reset_at = %next.next_reset_at,
            "Scheduled statistics reset completed"
        );

        self.ctx
            .publish(DomainEvent::StatsReset(StatsResetEvent {
                affected_members,
                boundary: Some(boundary),
                next_reset_at: Some(next.next_reset_at),
                timestamp: reset_at,
            }))
            .await;

        Ok(ResetReport {
            affected_members,
            boundary: Some(boundary),
            next_reset_at: Some(next.next_reset_at),
            reset_at,
        })
    }

    /// Set or replace the schedule and rearm the timer
    #[instrument(skip(self))]
    pub async fn configure(
        self: &Arc<Self>,
        first_boundary: DateTime<Utc>,
        interval_days: Option<u32>,
    ) -> ServiceResult<ScheduleResponse> {
        let now = self.ctx.now();
        if first_boundary <= now {
            return Err(ServiceError::validation("First boundary must be in the future"));
        }

        if interval_days == Some(0) {
            return Err(ServiceError::validation("Interval must be at least 1 day"));
        }

        // Waits out a reset in progress; the rearm below then drops its timer
        let _write = self.schedule_write.lock().await;
        let interval_days = match interval_days {
            Some(days) => days,
            None => self
                .ctx
                .schedule_repo()
                .load()
                .await?
                .map_or(self.config.interval_days, |current| current.interval_days),
        };

        let schedule = ResetSchedule::new(first_boundary, interval_days, now);
        self.ctx.schedule_repo().save(&schedule).await?;
        self.rearm();

        info!(
            next_reset_at = %schedule.next_reset_at,
            interval_days,
            "Reset schedule configured"
        );

        Ok(ScheduleResponse::from(&schedule))
    }

    /// [`ResetScheduler::configure`] from a command request
    pub async fn configure_from_request(
        self: &Arc<Self>,
        request: ScheduleRequest,
    ) -> ServiceResult<ScheduleResponse> {
        let first_boundary = parse_first_boundary(&request.first_boundary, self.ctx.now())
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        self.configure(first_boundary, request.interval_days).await
    }

    /// The persisted schedule
    #[instrument(skip(self))]
    pub async fn current(&self) -> ServiceResult<ScheduleResponse> {
        let schedule = self
            .ctx
            .schedule_repo()
            .load()
            .await?
            .ok_or(DomainError::ScheduleNotConfigured)?;
        Ok(ScheduleResponse::from(&schedule))
    }
}

impl std::fmt::Debug for ResetScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetScheduler")
            .field("config", &self.config)
            .field("armed", &self.is_armed())
            .finish()
    }
}
