//! PostgreSQL implementation of CheckInRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use temple_core::entities::CheckInRecord;
use temple_core::error::DomainError;
use temple_core::traits::{CheckInRepository, RepoResult};
use temple_core::value_objects::Snowflake;

use crate::mappers::convert_all;
use crate::models::CheckInRecordModel;

use super::error::{map_db_error, map_unique_violation};

const CHECK_IN_COLUMNS: &str =
    "id, registration_id, event_id, action, actor, is_current, recorded_at";

/// PostgreSQL implementation of CheckInRepository
#[derive(Clone)]
pub struct PgCheckInRepository {
    pool: PgPool,
}

impl PgCheckInRepository {
    /// Create a new PgCheckInRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository for PgCheckInRepository {
    #[instrument(skip(self, record), fields(registration_id = %record.registration_id))]
    async fn append(&self, record: &CheckInRecord) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO check_in_records (id, registration_id, event_id, action, actor,
                                          is_current, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(record.id.into_inner())
        .bind(record.registration_id.into_inner())
        .bind(record.event_id.into_inner())
        .bind(record.action.as_str())
        .bind(record.actor.as_str())
        .bind(record.is_current)
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The partial unique index allows one current record per registration
            map_unique_violation(e, || {
                DomainError::InternalError(format!(
                    "registration {} already has a current check-in",
                    record.registration_id
                ))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, undo), fields(registration_id = %undo.registration_id))]
    async fn undo(&self, current_id: Snowflake, undo: &CheckInRecord) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE check_in_records
            SET is_current = FALSE
            WHERE id = $1 AND is_current
            ",
        )
        .bind(current_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InternalError(format!(
                "check-in record {current_id} is not current"
            )));
        }

        sqlx::query(
            r"
            INSERT INTO check_in_records (id, registration_id, event_id, action, actor,
                                          is_current, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(undo.id.into_inner())
        .bind(undo.registration_id.into_inner())
        .bind(undo.event_id.into_inner())
        .bind(undo.action.as_str())
        .bind(undo.actor.as_str())
        .bind(undo.is_current)
        .bind(undo.recorded_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn current_for(&self, registration_id: Snowflake) -> RepoResult<Option<CheckInRecord>> {
        let sql = format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_in_records \
             WHERE registration_id = $1 AND is_current"
        );
        let result = sqlx::query_as::<_, CheckInRecordModel>(&sql)
            .bind(registration_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(CheckInRecord::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn history(&self, registration_id: Snowflake) -> RepoResult<Vec<CheckInRecord>> {
        let sql = format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_in_records \
             WHERE registration_id = $1 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, CheckInRecordModel>(&sql)
            .bind(registration_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        convert_all(rows)
    }

    #[instrument(skip(self))]
    async fn find_current_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<CheckInRecord>> {
        let sql = format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_in_records \
             WHERE event_id = $1 AND is_current"
        );
        let rows = sqlx::query_as::<_, CheckInRecordModel>(&sql)
            .bind(event_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        convert_all(rows)
    }
}
