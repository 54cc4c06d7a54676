//! PostgreSQL implementation of BlacklistRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use rankup_core::entities::BlacklistEntry;
use rankup_core::error::DomainError;
use rankup_core::traits::{BlacklistRepository, RepoResult};
use rankup_core::value_objects::Snowflake;

use crate::mappers::BlacklistInsert;
use crate::models::BlacklistModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of BlacklistRepository
#[derive(Clone)]
pub struct PgBlacklistRepository {
    pool: PgPool,
}

impl PgBlacklistRepository {
    /// Create a new PgBlacklistRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistRepository for PgBlacklistRepository {
    #[instrument(skip(self, entry), fields(member_id = %entry.member_id))]
    async fn add(&self, entry: &BlacklistEntry) -> RepoResult<()> {
        let row = BlacklistInsert::new(entry);

        sqlx::query(
            r"
            INSERT INTO blacklist (member_id, reason, issued_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ",
        )
        .bind(row.member_id)
        .bind(&row.reason)
        .bind(row.issued_by)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyBlacklisted(entry.member_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, member_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM blacklist WHERE member_id = $1")
            .bind(member_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotBlacklisted(member_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&self, member_id: Snowflake) -> RepoResult<Option<BlacklistEntry>> {
        let result = sqlx::query_as::<_, BlacklistModel>(
            r"
            SELECT member_id, reason, issued_by, created_at, updated_at
            FROM blacklist
            WHERE member_id = $1
            ",
        )
        .bind(member_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(BlacklistEntry::from))
    }

    #[instrument(skip(self))]
    async fn is_blacklisted(&self, member_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM blacklist WHERE member_id = $1)",
        )
        .bind(member_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<BlacklistEntry>> {
        let results = sqlx::query_as::<_, BlacklistModel>(
            r"
            SELECT member_id, reason, issued_by, created_at, updated_at
            FROM blacklist
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(BlacklistEntry::from).collect())
    }
}
