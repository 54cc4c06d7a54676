//! Platform ports - role mutations and outbound notifications

use std::collections::HashSet;

use async_trait::async_trait;

use super::repositories::RepoResult;
use crate::events::DomainEvent;
use crate::value_objects::Snowflake;

/// Access to the chat platform's role assignments.
///
/// Grant and revoke are idempotent: granting a held role or revoking an
/// absent one succeeds.
#[async_trait]
pub trait RoleGateway: Send + Sync {
    /// Current role set of a member
    async fn member_roles(&self, member_id: Snowflake) -> RepoResult<HashSet<Snowflake>>;

    async fn grant_role(&self, member_id: Snowflake, role_id: Snowflake, reason: &str)
        -> RepoResult<()>;

    async fn revoke_role(
        &self,
        member_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> RepoResult<()>;
}

/// Receiver for domain events (announcements, audit logging)
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()>;
}
