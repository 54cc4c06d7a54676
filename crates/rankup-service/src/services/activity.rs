//! Activity service
//!
//! Turns platform events into ledger updates and exposes the operator
//! stat adjustments. Event handlers never fail: every problem is logged
//! with the member and the event time, and the event is dropped.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use rankup_core::entities::VoiceSession;
use rankup_core::error::DomainError;
use rankup_core::events::{DomainEvent, StatsResetEvent};
use rankup_core::traits::RepoResult;
use rankup_core::value_objects::{Snowflake, StatKind};

use crate::dto::{
    ActivityOutcome, IgnoreReason, MemberStatsResponse, MessageEvent, ResetReport,
    StatAdjustRequest, StatAdjustResponse, StatOperation, VoiceStateEvent,
};
use crate::tracking::{VoiceStateChange, VoiceTransition};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Activity service
pub struct ActivityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ActivityService<'a> {
    /// Create a new ActivityService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Platform events
    // ========================================================================

    /// Count one message for a ranking member
    #[instrument(skip(self, event), fields(member_id = %event.member_id))]
    pub async fn on_message(&self, event: MessageEvent) -> ActivityOutcome {
        if event.is_bot {
            return ActivityOutcome::ignored(IgnoreReason::Bot);
        }
        if event.is_direct {
            return ActivityOutcome::ignored(IgnoreReason::DirectMessage);
        }
        if event.is_command() {
            return ActivityOutcome::ignored(IgnoreReason::Command);
        }

        let member_id = event.member_id;
        let at = event.at.unwrap_or_else(|| self.ctx.now());

        let roles = match self.ctx.resolve_roles(member_id, event.roles).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(
                    member_id = %member_id,
                    operation = "on_message",
                    at = %at,
                    error = %e,
                    "Could not read member roles, message dropped"
                );
                return ActivityOutcome::Dropped;
            }
        };

        if !self.ctx.ladder().is_ranking_member(&roles) {
            return ActivityOutcome::ignored(IgnoreReason::NotRankingMember);
        }

        if !self.ctx.rate_window().try_acquire(member_id, at) {
            return ActivityOutcome::ignored(IgnoreReason::RateLimited);
        }

        match self.count_message(member_id, event.joined_at, at).await {
            Ok(()) => {
                debug!(member_id = %member_id, "Message counted");
                ActivityOutcome::Counted
            }
            Err(e) => {
                error!(
                    member_id = %member_id,
                    operation = "add_messages",
                    at = %at,
                    error = %e,
                    "Failed to count message, event dropped"
                );
                ActivityOutcome::Dropped
            }
        }
    }

    /// Drive the voice session tracker and credit closed sessions
    #[instrument(skip(self, event), fields(member_id = %event.member_id))]
    pub async fn on_voice_state_change(&self, event: VoiceStateEvent) -> ActivityOutcome {
        if event.is_bot {
            return ActivityOutcome::ignored(IgnoreReason::Bot);
        }

        let change = VoiceStateChange {
            member_id: event.member_id,
            old_channel: event.old_channel_id,
            new_channel: event.new_channel_id,
            at: event.at.unwrap_or_else(|| self.ctx.now()),
        };
        if change.is_same_channel() {
            return ActivityOutcome::ignored(IgnoreReason::SameChannel);
        }

        let may_open = match change.new_channel {
            Some(_) => self.may_open_session(&change, event.roles, event.joined_at).await,
            None => false,
        };

        let transition = self.ctx.voice_tracker().apply(
            &change,
            self.ctx.settings().min_voice_session,
            self.ctx.snowflake_generator(),
            may_open,
        );

        match transition {
            VoiceTransition::Opened => {
                debug!(member_id = %change.member_id, channel_id = ?change.new_channel, "Voice session opened");
                ActivityOutcome::SessionOpened
            }
            VoiceTransition::Closed(session) => match self.credit(&session).await {
                Some(credited_minutes) => ActivityOutcome::SessionClosed { credited_minutes },
                None => ActivityOutcome::Dropped,
            },
            VoiceTransition::Reopened(session) => match self.credit(&session).await {
                Some(credited_minutes) => ActivityOutcome::SessionMoved { credited_minutes },
                None => ActivityOutcome::Dropped,
            },
            VoiceTransition::Untracked => ActivityOutcome::ignored(IgnoreReason::NoOpenSession),
            VoiceTransition::Unchanged => {
                ActivityOutcome::ignored(IgnoreReason::NotRankingMember)
            }
        }
    }

    async fn count_message(
        &self,
        member_id: Snowflake,
        joined_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        // Keep the platform join date when the event carries one
        if let Some(joined_at) = joined_at {
            self.ctx.ledger_repo().ensure_member(member_id, joined_at).await?;
        }
        self.ctx.ledger_repo().add_messages(member_id, 1, at).await
    }

    /// Ranking gate for opening a session; registers the member on success
    async fn may_open_session(
        &self,
        change: &VoiceStateChange,
        roles: Option<HashSet<Snowflake>>,
        joined_at: Option<DateTime<Utc>>,
    ) -> bool {
        let member_id = change.member_id;
        let roles = match self.ctx.resolve_roles(member_id, roles).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(
                    member_id = %member_id,
                    operation = "on_voice_state_change",
                    at = %change.at,
                    error = %e,
                    "Could not read member roles, session not opened"
                );
                return false;
            }
        };
        if !self.ctx.ladder().is_ranking_member(&roles) {
            return false;
        }

        let join_date = joined_at.unwrap_or(change.at);
        if let Err(e) = self.ctx.ledger_repo().ensure_member(member_id, join_date).await {
            warn!(
                member_id = %member_id,
                operation = "ensure_member",
                at = %change.at,
                error = %e,
                "Could not register member on voice join"
            );
        }
        true
    }

    /// Persist a closed session. Returns the credited minutes, or `None`
    /// when the store failed.
    async fn credit(&self, session: &VoiceSession) -> Option<i64> {
        if session.duration_minutes == 0 {
            debug!(
                member_id = %session.member_id,
                session_id = %session.session_id,
                "Voice session too short to credit"
            );
            return Some(0);
        }

        match self.ctx.ledger_repo().credit_voice_session(session).await {
            Ok(()) => {
                debug!(
                    member_id = %session.member_id,
                    minutes = session.duration_minutes,
                    "Voice session credited"
                );
                Some(session.duration_minutes)
            }
            Err(e) => {
                error!(
                    member_id = %session.member_id,
                    session_id = %session.session_id,
                    operation = "credit_voice_session",
                    join_time = %session.join_time,
                    leave_time = ?session.leave_time,
                    minutes = session.duration_minutes,
                    error = %e,
                    "Failed to credit voice session, event dropped"
                );
                None
            }
        }
    }

    // ========================================================================
    // Operator commands
    // ========================================================================

    /// Apply an add or remove adjustment
    pub async fn adjust(
        &self,
        member_id: Snowflake,
        request: StatAdjustRequest,
    ) -> ServiceResult<StatAdjustResponse> {
        match request.operation {
            StatOperation::Add => self.add_stats(member_id, request.kind, request.amount).await,
            StatOperation::Remove => {
                self.remove_stats(member_id, request.kind, request.amount).await
            }
        }
    }

    /// Add to a counter, creating the record when needed
    #[instrument(skip(self))]
    pub async fn add_stats(
        &self,
        member_id: Snowflake,
        kind: StatKind,
        amount: i64,
    ) -> ServiceResult<StatAdjustResponse> {
        Self::check_amount(amount)?;
        let now = self.ctx.now();
        let ledger = self.ctx.ledger_repo();

        ledger.ensure_member(member_id, now).await?;
        match kind {
            StatKind::Messages => ledger.add_messages(member_id, amount, now).await?,
            StatKind::VoiceMinutes => ledger.add_voice_minutes(member_id, amount, now).await?,
        }

        info!(member_id = %member_id, kind = %kind, amount, "Stats added");
        self.adjust_response(member_id, kind, amount).await
    }

    /// Subtract from a counter; the member must hold at least `amount`
    #[instrument(skip(self))]
    pub async fn remove_stats(
        &self,
        member_id: Snowflake,
        kind: StatKind,
        amount: i64,
    ) -> ServiceResult<StatAdjustResponse> {
        Self::check_amount(amount)?;
        let ledger = self.ctx.ledger_repo();

        let remaining = match kind {
            StatKind::Messages => ledger.remove_messages(member_id, amount).await?,
            StatKind::VoiceMinutes => ledger.remove_voice_minutes(member_id, amount).await?,
        };

        info!(member_id = %member_id, kind = %kind, amount, remaining, "Stats removed");
        self.adjust_response(member_id, kind, amount).await
    }

    /// Current counters of a member
    #[instrument(skip(self))]
    pub async fn stats(&self, member_id: Snowflake) -> ServiceResult<MemberStatsResponse> {
        let record = self
            .ctx
            .ledger_repo()
            .get_snapshot(member_id)
            .await?
            .ok_or(DomainError::MemberNotRegistered(member_id))?;
        Ok(MemberStatsResponse::from(&record))
    }

    /// Reset every member's counters now, leaving the schedule untouched
    #[instrument(skip(self))]
    pub async fn force_reset(&self) -> ServiceResult<ResetReport> {
        let affected_members = self.ctx.ledger_repo().reset_all().await.map_err(|e| {
            error!(operation = "force_reset", error = %e, "Forced reset failed and was rolled back");
            e
        })?;
        let reset_at = self.ctx.now();

        let next_reset_at = match self.ctx.schedule_repo().load().await {
            Ok(schedule) => schedule.map(|s| s.next_reset_at),
            Err(e) => {
                warn!(error = %e, "Could not read reset schedule after forced reset");
                None
            }
        };

        info!(affected_members, "Statistics reset by operator");

        self.ctx
            .publish(DomainEvent::StatsReset(StatsResetEvent {
                affected_members,
                boundary: None,
                next_reset_at,
                timestamp: reset_at,
            }))
            .await;

        Ok(ResetReport {
            affected_members,
            boundary: None,
            next_reset_at,
            reset_at,
        })
    }

    fn check_amount(amount: i64) -> ServiceResult<()> {
        if amount < 1 {
            return Err(ServiceError::validation("Amount must be at least 1"));
        }
        Ok(())
    }

    async fn adjust_response(
        &self,
        member_id: Snowflake,
        kind: StatKind,
        amount: i64,
    ) -> ServiceResult<StatAdjustResponse> {
        Ok(StatAdjustResponse {
            member_id,
            kind,
            amount,
            stats: self.stats(member_id).await?,
        })
    }
}
