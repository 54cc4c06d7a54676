//! PostgreSQL implementation of LedgerRepository
//!
//! Counter updates are single `SET x = x + $delta` statements so concurrent
//! writers never lose increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use rankup_core::entities::{MemberRecord, VoiceSession};
use rankup_core::error::DomainError;
use rankup_core::traits::{LedgerRepository, RepoResult};
use rankup_core::value_objects::{Snowflake, StatKind};

use crate::mappers::VoiceSessionInsert;
use crate::models::{MemberRecordModel, VoiceSessionModel};

use super::error::{map_db_error, member_not_registered};

const RECORD_COLUMNS: &str = "member_id, message_count, voice_minutes, join_date, \
     last_message_at, last_advance_at, created_at, updated_at";

/// PostgreSQL implementation of LedgerRepository
#[derive(Clone)]
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    /// Create a new PgLedgerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the record if absent, inside an open transaction
    async fn ensure_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        member_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO member_records (member_id, join_date, created_at, updated_at)
            VALUES ($1, $2, $2, $2)
            ON CONFLICT (member_id) DO NOTHING
            ",
        )
        .bind(member_id.into_inner())
        .bind(at)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn remove_stat(
        &self,
        member_id: Snowflake,
        kind: StatKind,
        amount: i64,
    ) -> RepoResult<i64> {
        let column = match kind {
            StatKind::Messages => "message_count",
            StatKind::VoiceMinutes => "voice_minutes",
        };

        let updated = sqlx::query_scalar::<_, i64>(&format!(
            r"
            UPDATE member_records
            SET {column} = {column} - $2, updated_at = NOW()
            WHERE member_id = $1 AND {column} >= $2
            RETURNING {column}
            "
        ))
        .bind(member_id.into_inner())
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(value) = updated {
            return Ok(value);
        }

        // Distinguish a missing record from an insufficient balance
        match self.get_snapshot(member_id).await? {
            Some(record) => Err(DomainError::InsufficientStats {
                available: record.stat(kind),
                requested: amount,
            }),
            None => Err(member_not_registered(member_id)),
        }
    }

    /// Most recent credited voice sessions of a member
    #[instrument(skip(self))]
    pub async fn recent_voice_sessions(
        &self,
        member_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<VoiceSession>> {
        let rows = sqlx::query_as::<_, VoiceSessionModel>(
            r"
            SELECT session_id, member_id, channel_id, join_time, leave_time, duration_minutes
            FROM voice_sessions
            WHERE member_id = $1
            ORDER BY join_time DESC
            LIMIT $2
            ",
        )
        .bind(member_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(VoiceSession::from).collect())
    }

    /// Number of message history rows for a member
    #[instrument(skip(self))]
    pub async fn message_history_len(&self, member_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM message_history WHERE member_id = $1")
            .bind(member_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    #[instrument(skip(self))]
    async fn ensure_member(
        &self,
        member_id: Snowflake,
        join_date: DateTime<Utc>,
    ) -> RepoResult<MemberRecord> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::ensure_in_tx(&mut tx, member_id, join_date).await?;

        let record = sqlx::query_as::<_, MemberRecordModel>(&format!(
            "SELECT {RECORD_COLUMNS} FROM member_records WHERE member_id = $1"
        ))
        .bind(member_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(record.into())
    }

    #[instrument(skip(self))]
    async fn add_messages(
        &self,
        member_id: Snowflake,
        delta: i64,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO member_records
                (member_id, message_count, join_date, last_message_at, created_at, updated_at)
            VALUES ($1, $2, $3, $3, $3, $3)
            ON CONFLICT (member_id) DO UPDATE SET
                message_count = member_records.message_count + EXCLUDED.message_count,
                last_message_at = EXCLUDED.last_message_at,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(member_id.into_inner())
        .bind(delta)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO message_history (member_id, message_count, recorded_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(member_id.into_inner())
        .bind(delta)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_voice_minutes(
        &self,
        member_id: Snowflake,
        delta: i64,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO member_records
                (member_id, voice_minutes, join_date, created_at, updated_at)
            VALUES ($1, $2, $3, $3, $3)
            ON CONFLICT (member_id) DO UPDATE SET
                voice_minutes = member_records.voice_minutes + EXCLUDED.voice_minutes,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(member_id.into_inner())
        .bind(delta)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_messages(&self, member_id: Snowflake, amount: i64) -> RepoResult<i64> {
        self.remove_stat(member_id, StatKind::Messages, amount).await
    }

    #[instrument(skip(self))]
    async fn remove_voice_minutes(&self, member_id: Snowflake, amount: i64) -> RepoResult<i64> {
        self.remove_stat(member_id, StatKind::VoiceMinutes, amount)
            .await
    }

    #[instrument(skip(self, session), fields(member_id = %session.member_id, session_id = %session.session_id))]
    async fn credit_voice_session(&self, session: &VoiceSession) -> RepoResult<()> {
        let Some(row) = VoiceSessionInsert::new(session) else {
            return Err(DomainError::ValidationError(
                "cannot credit an open voice session".to_string(),
            ));
        };

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::ensure_in_tx(&mut tx, session.member_id, row.join_time).await?;

        // The history row doubles as an idempotency key for the credit
        let inserted = sqlx::query(
            r"
            INSERT INTO voice_sessions
                (session_id, member_id, channel_id, join_time, leave_time, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id) DO NOTHING
            ",
        )
        .bind(row.session_id)
        .bind(row.member_id)
        .bind(row.channel_id)
        .bind(row.join_time)
        .bind(row.leave_time)
        .bind(row.duration_minutes)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if inserted > 0 {
            sqlx::query(
                r"
                UPDATE member_records
                SET voice_minutes = voice_minutes + $2, updated_at = $3
                WHERE member_id = $1
                ",
            )
            .bind(row.member_id)
            .bind(row.duration_minutes)
            .bind(row.leave_time)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_snapshot(&self, member_id: Snowflake) -> RepoResult<Option<MemberRecord>> {
        let result = sqlx::query_as::<_, MemberRecordModel>(&format!(
            "SELECT {RECORD_COLUMNS} FROM member_records WHERE member_id = $1"
        ))
        .bind(member_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MemberRecord::from))
    }

    #[instrument(skip(self))]
    async fn record_advance(&self, member_id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE member_records
            SET last_advance_at = $2, updated_at = $2
            WHERE member_id = $1
            ",
        )
        .bind(member_id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(member_not_registered(member_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_all(&self) -> RepoResult<u64> {
        // Dropping the transaction on any error rolls everything back
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let affected = sqlx::query(
            r"
            UPDATE member_records
            SET message_count = 0, voice_minutes = 0, updated_at = NOW()
            ",
        )
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        sqlx::query("DELETE FROM message_history")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("DELETE FROM voice_sessions")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        info!(affected, "Ledger reset committed");
        Ok(affected)
    }
}
