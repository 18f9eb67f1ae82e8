//! PostgreSQL implementation of RegistrationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use temple_core::entities::Registration;
use temple_core::error::DomainError;
use temple_core::traits::{
    Page, PageRequest, RegistrationFilter, RegistrationRepository, RepoResult, StatusCounts,
};
use temple_core::value_objects::Snowflake;

use crate::mappers::{convert_all, status_counts};
use crate::models::{CountModel, RegistrationModel, StatusCountModel};

use super::error::{
    like_pattern, map_db_error, map_unique_violation, registration_not_found, to_bind, to_total,
};

const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, name, phone, email, note, source, \
     status, created_at, updated_at, canceled_at";

// $1 event, $2 status, $3 keyword pattern
const REGISTRATION_FILTER: &str = "event_id = $1 \
     AND ($2::VARCHAR IS NULL OR status = $2) \
     AND ($3::TEXT IS NULL OR name ILIKE $3 OR phone ILIKE $3 OR email ILIKE $3)";

/// PostgreSQL implementation of RegistrationRepository
#[derive(Clone)]
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    /// Create a new PgRegistrationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Registration>> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
        let result = sqlx::query_as::<_, RegistrationModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Registration::try_from).transpose()
    }

    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    async fn create(&self, registration: &Registration) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO registrations (id, event_id, user_id, name, phone, email, note, source,
                                       status, created_at, updated_at, canceled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(registration.id.into_inner())
        .bind(registration.event_id.into_inner())
        .bind(&registration.user_id)
        .bind(&registration.registrant.name)
        .bind(&registration.registrant.phone)
        .bind(&registration.registrant.email)
        .bind(&registration.registrant.note)
        .bind(registration.source.as_str())
        .bind(registration.status.as_str())
        .bind(registration.created_at)
        .bind(registration.updated_at)
        .bind(registration.canceled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::InternalError(format!("duplicate registration id {}", registration.id))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    async fn update(&self, registration: &Registration) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE registrations
            SET status = $2, updated_at = $3, canceled_at = $4
            WHERE id = $1
            ",
        )
        .bind(registration.id.into_inner())
        .bind(registration.status.as_str())
        .bind(registration.updated_at)
        .bind(registration.canceled_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(registration_not_found(registration.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, RegistrationModel>(&sql)
            .bind(event_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        convert_all(rows)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, event_id: Snowflake) -> RepoResult<StatusCounts> {
        let rows = sqlx::query_as::<_, StatusCountModel>(
            r"
            SELECT status, COUNT(*) AS count
            FROM registrations
            WHERE event_id = $1
            GROUP BY status
            ",
        )
        .bind(event_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        status_counts(rows)
    }

    #[instrument(skip(self))]
    async fn oldest_waitlisted(&self, event_id: Snowflake) -> RepoResult<Option<Registration>> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE event_id = $1 AND status = 'waitlist' \
             ORDER BY created_at, id LIMIT 1"
        );
        let result = sqlx::query_as::<_, RegistrationModel>(&sql)
            .bind(event_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Registration::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Registration>> {
        let event_id = filter.event_id.into_inner();
        let status = filter.status.map(|s| s.as_str());
        let pattern = like_pattern(filter.keyword.as_deref());

        let count_sql =
            format!("SELECT COUNT(*) AS count FROM registrations WHERE {REGISTRATION_FILTER}");
        let total = sqlx::query_as::<_, CountModel>(&count_sql)
            .bind(event_id)
            .bind(status)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE {REGISTRATION_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, RegistrationModel>(&sql)
            .bind(event_id)
            .bind(status)
            .bind(&pattern)
            .bind(to_bind(page.limit()))
            .bind(to_bind(page.offset()))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(convert_all(rows)?, to_total(total.count), page))
    }
}
