//! Advancement coordinator
//!
//! Every rank change for a member runs under that member's lock, so two
//! concurrent attempts observe each other's role changes and ledger stamp.

use std::collections::HashSet;

use tracing::{error, info, instrument, warn};

use rankup_core::entities::RankLadder;
use rankup_core::error::DomainError;
use rankup_core::events::{DomainEvent, RankChangedEvent, RanksClearedEvent};
use rankup_core::policy::evaluate;
use rankup_core::value_objects::Snowflake;

use crate::dto::{AdvanceOutcome, DerankAllOutcome, DerankOutcome, RoleFailure};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const ADVANCE_REASON: &str = "Rank advance";
const ENTRY_REASON: &str = "Initial rank assignment";
const DERANK_REASON: &str = "Rank lowered";
const CLEAR_REASON: &str = "All ranks removed";

/// Role changes needed to move a member onto one rung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePlan {
    /// Rank role of the target rung; the change fails if this grant fails
    pub rank_role: Snowflake,
    pub grant: Vec<Snowflake>,
    pub revoke: Vec<Snowflake>,
}

impl RolePlan {
    /// Move up to `target`: add its rank and permission roles, drop every
    /// other rank role and every non-matching permission role held.
    pub fn advance(ladder: &RankLadder, held: &HashSet<Snowflake>, target: usize) -> Option<Self> {
        let rank_role = ladder.get(target)?.role_id;
        let permission_role = ladder.permission_role_for(target);

        let grant = permission_role
            .filter(|role| *role != rank_role && !held.contains(role))
            .into_iter()
            .collect();
        let revoke = ladder
            .rank_role_ids()
            .filter(|role| *role != rank_role)
            .chain(
                ladder
                    .permission_role_ids()
                    .filter(|role| Some(*role) != permission_role),
            )
            .filter(|role| held.contains(role))
            .collect();

        Some(Self {
            rank_role,
            grant,
            revoke,
        })
    }

    /// Move down one rung from `from`. Permission roles only change when
    /// the two rungs link different tiers.
    pub fn derank(ladder: &RankLadder, held: &HashSet<Snowflake>, from: usize) -> Option<Self> {
        let target = from.checked_sub(1)?;
        let rank_role = ladder.get(target)?.role_id;
        let current_role = ladder.get(from)?.role_id;
        let current_permission = ladder.permission_role_for(from);
        let target_permission = ladder.permission_role_for(target);

        let grant = target_permission
            .filter(|role| Some(*role) != current_permission && !held.contains(role))
            .into_iter()
            .collect();
        let mut revoke = vec![current_role];
        if let Some(role) = current_permission {
            if Some(role) != target_permission && held.contains(&role) {
                revoke.push(role);
            }
        }

        Some(Self {
            rank_role,
            grant,
            revoke,
        })
    }
}

/// Secondary role changes that went through or failed
#[derive(Debug, Default)]
struct AppliedRoles {
    granted: Vec<Snowflake>,
    revoked: Vec<Snowflake>,
    failures: Vec<RoleFailure>,
}

/// Advancement service
pub struct AdvancementService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdvancementService<'a> {
    /// Create a new AdvancementService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Advance a member by one rung if the ladder policy allows it
    #[instrument(skip(self))]
    pub async fn attempt_advance(&self, member_id: Snowflake) -> ServiceResult<AdvanceOutcome> {
        let guard = self.ctx.member_locks().lock(member_id).await;
        let result = self.advance_locked(member_id).await;
        drop(guard);
        self.ctx.member_locks().prune();
        result
    }

    async fn advance_locked(&self, member_id: Snowflake) -> ServiceResult<AdvanceOutcome> {
        if self.ctx.blacklist_repo().is_blacklisted(member_id).await? {
            return Err(DomainError::MemberBlacklisted(member_id).into());
        }

        let record = self
            .ctx
            .ledger_repo()
            .get_snapshot(member_id)
            .await?
            .ok_or(DomainError::MemberNotRegistered(member_id))?;

        let ladder = self.ctx.ladder();
        let mut held = self.ctx.role_gateway().member_roles(member_id).await?;

        let (from_rank, entry_role_assigned) = match ladder.current_index(&held) {
            Some(index) => (index, false),
            None => {
                let entry_role = ladder.entry().role_id;
                match self
                    .ctx
                    .role_gateway()
                    .grant_role(member_id, entry_role, ENTRY_REASON)
                    .await
                {
                    Ok(()) => {
                        held.insert(entry_role);
                    }
                    Err(e) => warn!(
                        member_id = %member_id,
                        role_id = %entry_role,
                        error = %e,
                        "Failed to assign entry rank role"
                    ),
                }
                (0, true)
            }
        };

        if ladder.is_last(from_rank) {
            return Err(DomainError::AlreadyMaxRank.into());
        }

        let now = self.ctx.now();
        let eligibility = evaluate(&record, ladder, from_rank, now, self.ctx.settings().cooldown);
        if let Some(blocked) = eligibility.blocking_error() {
            return Err(blocked.into());
        }

        let to_rank = from_rank + 1;
        let plan = RolePlan::advance(ladder, &held, to_rank)
            .ok_or_else(|| ServiceError::internal(format!("rank {to_rank} missing from ladder")))?;

        self.grant_decisive(member_id, plan.rank_role, ADVANCE_REASON, from_rank, to_rank)
            .await?;
        let applied = self.apply_secondary(member_id, &plan, ADVANCE_REASON).await;

        if let Err(e) = self.ctx.ledger_repo().record_advance(member_id, now).await {
            error!(
                member_id = %member_id,
                from_rank,
                to_rank,
                error = %e,
                "Rank roles changed but the advance was not recorded; cooldown will not apply"
            );
            return Err(e.into());
        }

        let rank_name = ladder
            .get(to_rank)
            .map(|rank| rank.name.clone())
            .unwrap_or_default();

        info!(
            member_id = %member_id,
            from_rank,
            to_rank,
            rank = %rank_name,
            role_failures = applied.failures.len(),
            "Member advanced"
        );

        self.ctx
            .publish(DomainEvent::RankAdvanced(RankChangedEvent {
                member_id,
                from_rank,
                to_rank,
                rank_name: rank_name.clone(),
                timestamp: now,
            }))
            .await;

        let mut granted_roles = vec![plan.rank_role];
        granted_roles.extend(applied.granted);

        Ok(AdvanceOutcome {
            member_id,
            from_rank,
            to_rank,
            rank_name,
            entry_role_assigned,
            granted_roles,
            revoked_roles: applied.revoked,
            role_failures: applied.failures,
            advanced_at: now,
        })
    }

    /// Move a member down one rung
    #[instrument(skip(self))]
    pub async fn derank(&self, member_id: Snowflake) -> ServiceResult<DerankOutcome> {
        let guard = self.ctx.member_locks().lock(member_id).await;
        let result = self.derank_locked(member_id).await;
        drop(guard);
        self.ctx.member_locks().prune();
        result
    }

    async fn derank_locked(&self, member_id: Snowflake) -> ServiceResult<DerankOutcome> {
        let ladder = self.ctx.ladder();
        let held = self.ctx.role_gateway().member_roles(member_id).await?;

        let from_rank = ladder.current_index(&held).ok_or(DomainError::NoRankRoles)?;
        if from_rank == 0 {
            return Err(DomainError::AlreadyLowestRank.into());
        }
        let to_rank = from_rank - 1;
        let plan = RolePlan::derank(ladder, &held, from_rank)
            .ok_or_else(|| ServiceError::internal(format!("rank {to_rank} missing from ladder")))?;

        self.grant_decisive(member_id, plan.rank_role, DERANK_REASON, from_rank, to_rank)
            .await?;
        let applied = self.apply_secondary(member_id, &plan, DERANK_REASON).await;

        let rank_name = ladder
            .get(to_rank)
            .map(|rank| rank.name.clone())
            .unwrap_or_default();

        info!(member_id = %member_id, from_rank, to_rank, rank = %rank_name, "Member deranked");

        self.ctx
            .publish(DomainEvent::RankLowered(RankChangedEvent {
                member_id,
                from_rank,
                to_rank,
                rank_name: rank_name.clone(),
                timestamp: self.ctx.now(),
            }))
            .await;

        let mut granted_roles = vec![plan.rank_role];
        granted_roles.extend(applied.granted);

        Ok(DerankOutcome {
            member_id,
            from_rank,
            to_rank,
            rank_name,
            granted_roles,
            revoked_roles: applied.revoked,
            role_failures: applied.failures,
        })
    }

    /// Remove every rank and permission role the member holds
    #[instrument(skip(self))]
    pub async fn derank_all(&self, member_id: Snowflake) -> ServiceResult<DerankAllOutcome> {
        let guard = self.ctx.member_locks().lock(member_id).await;
        let result = self.derank_all_locked(member_id).await;
        drop(guard);
        self.ctx.member_locks().prune();
        result
    }

    async fn derank_all_locked(&self, member_id: Snowflake) -> ServiceResult<DerankAllOutcome> {
        let ladder = self.ctx.ladder();
        let held = self.ctx.role_gateway().member_roles(member_id).await?;

        let targets: Vec<Snowflake> = ladder
            .rank_role_ids()
            .chain(ladder.permission_role_ids())
            .filter(|role| held.contains(role))
            .collect();
        if targets.is_empty() {
            return Err(DomainError::NoRankRoles.into());
        }

        let mut applied = AppliedRoles::default();
        for role_id in targets {
            self.revoke_logged(member_id, role_id, CLEAR_REASON, &mut applied)
                .await;
        }

        if applied.revoked.is_empty() {
            let detail = applied
                .failures
                .first()
                .map(|failure| failure.error.clone())
                .unwrap_or_default();
            return Err(DomainError::RoleSideEffect(detail).into());
        }

        info!(
            member_id = %member_id,
            removed = applied.revoked.len(),
            failed = applied.failures.len(),
            "All rank roles removed"
        );

        self.ctx
            .publish(DomainEvent::RanksCleared(RanksClearedEvent {
                member_id,
                removed_roles: applied.revoked.clone(),
                timestamp: self.ctx.now(),
            }))
            .await;

        Ok(DerankAllOutcome {
            member_id,
            removed_roles: applied.revoked,
            role_failures: applied.failures,
        })
    }

    /// The grant that decides whether a rank change happened
    async fn grant_decisive(
        &self,
        member_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
        from_rank: usize,
        to_rank: usize,
    ) -> ServiceResult<()> {
        self.ctx
            .role_gateway()
            .grant_role(member_id, role_id, reason)
            .await
            .map_err(|e| {
                error!(
                    member_id = %member_id,
                    role_id = %role_id,
                    from_rank,
                    to_rank,
                    error = %e,
                    "Rank role grant failed, nothing changed"
                );
                DomainError::RoleSideEffect(e.to_string()).into()
            })
    }

    async fn apply_secondary(
        &self,
        member_id: Snowflake,
        plan: &RolePlan,
        reason: &str,
    ) -> AppliedRoles {
        let mut applied = AppliedRoles::default();

        for &role_id in &plan.grant {
            match self.ctx.role_gateway().grant_role(member_id, role_id, reason).await {
                Ok(()) => applied.granted.push(role_id),
                Err(e) => {
                    error!(
                        member_id = %member_id,
                        role_id = %role_id,
                        error = %e,
                        "Permission role grant failed after rank change"
                    );
                    applied.failures.push(RoleFailure {
                        role_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        for &role_id in &plan.revoke {
            self.revoke_logged(member_id, role_id, reason, &mut applied)
                .await;
        }

        applied
    }

    async fn revoke_logged(
        &self,
        member_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
        applied: &mut AppliedRoles,
    ) {
        match self
            .ctx
            .role_gateway()
            .revoke_role(member_id, role_id, reason)
            .await
        {
            Ok(()) => applied.revoked.push(role_id),
            Err(e) => {
                error!(
                    member_id = %member_id,
                    role_id = %role_id,
                    error = %e,
                    "Role revocation failed, member holds a stale role"
                );
                applied.failures.push(RoleFailure {
                    role_id,
                    error: e.to_string(),
                });
            }
        }
    }
}
