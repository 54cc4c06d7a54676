//! Rank service
//!
//! Read-only view of a member's standing on the ladder.

use tracing::instrument;

use rankup_core::error::DomainError;
use rankup_core::policy::evaluate;
use rankup_core::value_objects::Snowflake;

use crate::dto::{RankSummary, RankViewResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Rank service
pub struct RankService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RankService<'a> {
    /// Create a new RankService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ledger snapshot, current rank and progress towards the next rank.
    ///
    /// A member without a rank role is evaluated from the entry rung, the
    /// same way an advance attempt would treat them.
    #[instrument(skip(self))]
    pub async fn rank_view(&self, member_id: Snowflake) -> ServiceResult<RankViewResponse> {
        let record = self
            .ctx
            .ledger_repo()
            .get_snapshot(member_id)
            .await?
            .ok_or(DomainError::MemberNotRegistered(member_id))?;

        let roles = self.ctx.role_gateway().member_roles(member_id).await?;
        let blacklisted = self.ctx.blacklist_repo().is_blacklisted(member_id).await?;

        let ladder = self.ctx.ladder();
        let current = ladder.current_index(&roles);
        let eligibility = evaluate(
            &record,
            ladder,
            current.unwrap_or(0),
            self.ctx.now(),
            self.ctx.settings().cooldown,
        );

        Ok(RankViewResponse {
            member_id,
            message_count: record.message_count,
            voice_minutes: record.voice_minutes,
            voice_hours: record.voice_hours(),
            join_date: record.join_date,
            last_advance_at: record.last_advance_at,
            current_rank: current.and_then(|index| RankSummary::of(ladder, index)),
            is_max_rank: !eligibility.has_next(),
            on_cooldown: eligibility.on_cooldown,
            cooldown_remaining_secs: eligibility.cooldown_remaining_secs,
            overall_percent: eligibility.overall_percent(),
            can_advance: eligibility.can_advance() && !blacklisted,
            next_rank: eligibility.next,
            blacklisted,
        })
    }
}
