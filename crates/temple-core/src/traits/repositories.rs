//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Registrations and check-in records are
//! never deleted, so none of these traits expose a delete.

use async_trait::async_trait;
use serde::Serialize;

use crate::entities::{CheckInRecord, Event, EventStatus, Registration, RegistrationStatus};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Pagination
// ============================================================================

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size.max(1)))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ============================================================================
// Event Repository
// ============================================================================

/// Event listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub organization_id: Option<Snowflake>,
    pub status: Option<EventStatus>,
    /// Case-insensitive substring of title or location
    pub keyword: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if self.organization_id.is_some_and(|org| org != event.organization_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != event.status) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(k) if !k.is_empty() => {
                let k = k.to_lowercase();
                contains_ci(&event.title, &k) || contains_ci(&event.location, &k)
            }
            _ => true,
        }
    }
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find event by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Event>>;

    /// Create a new event
    async fn create(&self, event: &Event) -> RepoResult<()>;

    /// Update an existing event
    async fn update(&self, event: &Event) -> RepoResult<()>;

    /// List events, newest first
    async fn list(&self, filter: &EventFilter, page: PageRequest) -> RepoResult<Page<Event>>;
}

// ============================================================================
// Registration Repository
// ============================================================================

/// Registration listing filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub event_id: Snowflake,
    pub status: Option<RegistrationStatus>,
    /// Case-insensitive substring of name, phone or email
    pub keyword: Option<String>,
}

impl RegistrationFilter {
    pub fn for_event(event_id: Snowflake) -> Self {
        Self {
            event_id,
            status: None,
            keyword: None,
        }
    }

    pub fn matches(&self, registration: &Registration) -> bool {
        if registration.event_id != self.event_id {
            return false;
        }
        if self.status.is_some_and(|s| s != registration.status) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(k) if !k.is_empty() => {
                let k = k.to_lowercase();
                let r = &registration.registrant;
                contains_ci(&r.name, &k)
                    || contains_ci(&r.phone, &k)
                    || r.email.as_deref().is_some_and(|e| contains_ci(e, &k))
            }
            _ => true,
        }
    }
}

/// Registrations of one event grouped by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub registered: u32,
    pub waitlist: u32,
    pub canceled: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: RegistrationStatus) {
        match status {
            RegistrationStatus::Registered => self.registered += 1,
            RegistrationStatus::Waitlist => self.waitlist += 1,
            RegistrationStatus::Canceled => self.canceled += 1,
        }
    }
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Find registration by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Registration>>;

    /// Create a new registration
    async fn create(&self, registration: &Registration) -> RepoResult<()>;

    /// Persist a status change
    async fn update(&self, registration: &Registration) -> RepoResult<()>;

    /// Every registration of an event, in any status (full scan)
    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<Registration>>;

    /// Count registrations of an event by status
    async fn count_by_status(&self, event_id: Snowflake) -> RepoResult<StatusCounts>;

    /// Oldest waitlisted registration (creation time, then id)
    async fn oldest_waitlisted(&self, event_id: Snowflake) -> RepoResult<Option<Registration>>;

    /// List registrations, newest first
    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Registration>>;
}

// ============================================================================
// Check-in Repository
// ============================================================================

#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Append a record to a registration's history
    async fn append(&self, record: &CheckInRecord) -> RepoResult<()>;

    /// Clear the current marker of `current_id` and append `undo`
    ///
    /// Both writes land together or not at all.
    async fn undo(&self, current_id: Snowflake, undo: &CheckInRecord) -> RepoResult<()>;

    /// Current check-in of a registration, if any
    async fn current_for(&self, registration_id: Snowflake) -> RepoResult<Option<CheckInRecord>>;

    /// Full history of a registration, oldest first
    async fn history(&self, registration_id: Snowflake) -> RepoResult<Vec<CheckInRecord>>;

    /// Every current check-in of an event
    async fn find_current_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<CheckInRecord>>;
}

// ============================================================================
// Health
// ============================================================================

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Check that storage is reachable
    async fn ping(&self) -> RepoResult<()>;
}
