//! PostgreSQL implementation of ResetScheduleRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use rankup_core::entities::ResetSchedule;
use rankup_core::traits::{RepoResult, ResetScheduleRepository};

use crate::mappers::ScheduleUpsert;
use crate::models::ResetScheduleModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgResetScheduleRepository {
    pool: PgPool,
}

impl PgResetScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetScheduleRepository for PgResetScheduleRepository {
    #[instrument(skip(self))]
    async fn load(&self) -> RepoResult<Option<ResetSchedule>> {
        let result = sqlx::query_as::<_, ResetScheduleModel>(
            "SELECT next_reset_at, interval_days, updated_at FROM reset_schedule WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ResetSchedule::from))
    }

    #[instrument(skip(self))]
    async fn save(&self, schedule: &ResetSchedule) -> RepoResult<()> {
        let row = ScheduleUpsert::new(schedule);

        sqlx::query(
            r"
            INSERT INTO reset_schedule (id, next_reset_at, interval_days, updated_at)
            VALUES (1, $1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                next_reset_at = EXCLUDED.next_reset_at,
                interval_days = EXCLUDED.interval_days,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(row.next_reset_at)
        .bind(row.interval_days)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
