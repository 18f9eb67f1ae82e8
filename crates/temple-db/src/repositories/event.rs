//! PostgreSQL implementation of EventRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use temple_core::entities::Event;
use temple_core::error::DomainError;
use temple_core::traits::{EventFilter, EventRepository, Page, PageRequest, RepoResult};
use temple_core::value_objects::Snowflake;

use crate::mappers::{convert_all, EventRow};
use crate::models::{CountModel, EventModel};

use super::error::{event_not_found, like_pattern, map_db_error, map_unique_violation, to_bind, to_total};

const EVENT_COLUMNS: &str = "id, organization_id, title, description, location, starts_at, ends_at, \
     registration_closes_at, capacity, fee_cents, cover_asset, status, created_by, \
     created_at, updated_at";

// $1 organization, $2 status, $3 keyword pattern; NULL disables the condition
const EVENT_FILTER: &str = "($1::BIGINT IS NULL OR organization_id = $1) \
     AND ($2::VARCHAR IS NULL OR status = $2) \
     AND ($3::TEXT IS NULL OR title ILIKE $3 OR location ILIKE $3)";

/// PostgreSQL implementation of EventRepository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Create a new PgEventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let result = sqlx::query_as::<_, EventModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Event::try_from).transpose()
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create(&self, event: &Event) -> RepoResult<()> {
        let row = EventRow::new(event);
        sqlx::query(
            r"
            INSERT INTO events (id, organization_id, title, description, location, starts_at,
                                ends_at, registration_closes_at, capacity, fee_cents,
                                cover_asset, status, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(row.id)
        .bind(row.organization_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.registration_closes_at)
        .bind(row.capacity)
        .bind(event.fee_cents)
        .bind(&event.cover_asset)
        .bind(row.status)
        .bind(event.created_by.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::InternalError(format!("duplicate event id {}", event.id))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update(&self, event: &Event) -> RepoResult<()> {
        let row = EventRow::new(event);
        let result = sqlx::query(
            r"
            UPDATE events
            SET title = $2, description = $3, location = $4, starts_at = $5, ends_at = $6,
                registration_closes_at = $7, capacity = $8, fee_cents = $9, cover_asset = $10,
                status = $11, updated_at = $12
            WHERE id = $1
            ",
        )
        .bind(row.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.registration_closes_at)
        .bind(row.capacity)
        .bind(event.fee_cents)
        .bind(&event.cover_asset)
        .bind(row.status)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(event_not_found(event.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &EventFilter, page: PageRequest) -> RepoResult<Page<Event>> {
        let org = filter.organization_id.map(Snowflake::into_inner);
        let status = filter.status.map(|s| s.as_str());
        let pattern = like_pattern(filter.keyword.as_deref());

        let count_sql = format!("SELECT COUNT(*) AS count FROM events WHERE {EVENT_FILTER}");
        let total = sqlx::query_as::<_, CountModel>(&count_sql)
            .bind(org)
            .bind(status)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE {EVENT_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, EventModel>(&sql)
            .bind(org)
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
