//! Permission role synchronisation
//!
//! When a member gains a rank role by any means, the permission role
//! linked to that rank is granted if missing.

use tracing::{debug, error, info, instrument};

use crate::dto::{MemberRolesEvent, RoleFailure, RoleSyncOutcome};

use super::context::ServiceContext;

const SYNC_REASON: &str = "Permission role for rank";

/// Role sync service
pub struct RoleSyncService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoleSyncService<'a> {
    /// Create a new RoleSyncService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Grant permission roles for newly added rank roles. Never fails;
    /// grant errors are logged and reported in the outcome.
    #[instrument(skip(self, event), fields(member_id = %event.member_id))]
    pub async fn on_roles_changed(&self, event: MemberRolesEvent) -> RoleSyncOutcome {
        let mut outcome = RoleSyncOutcome::default();
        if event.is_bot {
            return outcome;
        }

        let ladder = self.ctx.ladder();
        let mut missing: Vec<_> = event
            .added_roles()
            .filter_map(|role| ladder.rank_for_role(role))
            .filter_map(|rank| ladder.permission_role_for(rank.rank_index))
            .filter(|permission_role| !event.new_roles.contains(permission_role))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        if missing.is_empty() {
            debug!("No permission roles to sync");
            return outcome;
        }

        for role_id in missing {
            match self
                .ctx
                .role_gateway()
                .grant_role(event.member_id, role_id, SYNC_REASON)
                .await
            {
                Ok(()) => {
                    info!(member_id = %event.member_id, role_id = %role_id, "Permission role granted");
                    outcome.granted_roles.push(role_id);
                }
                Err(e) => {
                    error!(
                        member_id = %event.member_id,
                        role_id = %role_id,
                        operation = "on_roles_changed",
                        error = %e,
                        "Failed to grant permission role"
                    );
                    outcome.role_failures.push(RoleFailure {
                        role_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}
