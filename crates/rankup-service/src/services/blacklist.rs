//! Blacklist service
//!
//! Blacklisted members keep accumulating activity but cannot advance.

use tracing::{info, instrument};

use rankup_core::entities::BlacklistEntry;
use rankup_core::error::DomainError;
use rankup_core::events::{BlacklistChangedEvent, DomainEvent};
use rankup_core::value_objects::Snowflake;

use crate::dto::{BlacklistEntryResponse, BlacklistRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Blacklist service
pub struct BlacklistService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BlacklistService<'a> {
    /// Create a new BlacklistService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Blacklist a member, registering them in the ledger first if needed
    #[instrument(skip(self, request))]
    pub async fn add(
        &self,
        member_id: Snowflake,
        request: BlacklistRequest,
    ) -> ServiceResult<BlacklistEntryResponse> {
        let now = self.ctx.now();
        self.ctx.ledger_repo().ensure_member(member_id, now).await?;

        let reason = request
            .reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());
        let entry = BlacklistEntry::new(member_id, reason, request.issued_by, now);
        self.ctx.blacklist_repo().add(&entry).await?;

        info!(member_id = %member_id, issued_by = ?entry.issued_by, "Member blacklisted");

        self.ctx
            .publish(DomainEvent::MemberBlacklisted(BlacklistChangedEvent {
                member_id,
                issued_by: entry.issued_by,
                timestamp: now,
            }))
            .await;

        Ok(BlacklistEntryResponse::from(entry))
    }

    /// Lift a blacklist entry
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        member_id: Snowflake,
        issued_by: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.ctx.blacklist_repo().remove(member_id).await?;

        info!(member_id = %member_id, "Member removed from blacklist");

        self.ctx
            .publish(DomainEvent::MemberUnblacklisted(BlacklistChangedEvent {
                member_id,
                issued_by,
                timestamp: self.ctx.now(),
            }))
            .await;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, member_id: Snowflake) -> ServiceResult<BlacklistEntryResponse> {
        let entry = self
            .ctx
            .blacklist_repo()
            .find(member_id)
            .await?
            .ok_or(DomainError::NotBlacklisted(member_id))?;
        Ok(BlacklistEntryResponse::from(entry))
    }

    /// All entries, newest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<BlacklistEntryResponse>> {
        let entries = self.ctx.blacklist_repo().list().await?;
        Ok(entries.into_iter().map(BlacklistEntryResponse::from).collect())
    }
}
