//! Query service
//!
//! Paginated, filtered read views over events and registrations for admin
//! tooling and export. Reads take no ledger lock and may trail a concurrent
//! write.

use tracing::instrument;

use temple_core::{
    DomainError, Event, EventFilter, Page, PageRequest, Registration, RegistrationFilter,
    Snowflake,
};

use crate::dto::PaginationQuery;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Event row with its confirmed registration count
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub event: Event,
    pub confirmed_count: u64,
}

/// Query service
pub struct QueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> QueryService<'a> {
    /// Create a new QueryService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Events matching the filter, newest first
    #[instrument(skip(self))]
    pub async fn list_events(
        &self,
        filter: EventFilter,
        pagination: PaginationQuery,
    ) -> ServiceResult<Page<EventSummary>> {
        let page = self
            .ctx
            .event_repo()
            .list(&filter, self.page_request(pagination))
            .await?;

        let mut confirmed = Vec::with_capacity(page.items.len());
        for event in &page.items {
            let counts = self.ctx.registration_repo().count_by_status(event.id).await?;
            confirmed.push(u64::from(counts.registered));
        }
        let mut confirmed = confirmed.into_iter();
        Ok(page.map(|event| EventSummary {
            event,
            confirmed_count: confirmed.next().unwrap_or_default(),
        }))
    }

    /// Registrations of one event matching the filter, newest first
    #[instrument(skip(self))]
    pub async fn list_registrations(
        &self,
        filter: RegistrationFilter,
        pagination: PaginationQuery,
    ) -> ServiceResult<Page<Registration>> {
        let event_id = filter.event_id;
        self.ensure_event(event_id).await?;
        Ok(self
            .ctx
            .registration_repo()
            .list(&filter, self.page_request(pagination))
            .await?)
    }

    /// Resolve page parameters against the configured defaults and limit
    pub fn page_request(&self, pagination: PaginationQuery) -> PageRequest {
        let listing = self.ctx.listing();
        let page_size = pagination
            .page_size
            .unwrap_or(listing.default_page_size)
            .min(listing.max_page_size);
        PageRequest::new(pagination.page.unwrap_or(1), page_size)
    }

    async fn ensure_event(&self, event_id: Snowflake) -> ServiceResult<()> {
        self.ctx
            .event_repo()
            .find_by_id(event_id)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?;
        Ok(())
    }
}
