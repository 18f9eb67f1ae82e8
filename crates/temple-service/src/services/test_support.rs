//! Fixtures shared by the service tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use temple_common::ListingConfig;
use temple_core::traits::{
    CheckInRepository, Notifier, Page, PageRequest, RegistrationFilter, RegistrationRepository,
    RepoResult, StatusCounts,
};
use temple_core::{
    Actor, Capacity, CheckInRecord, DomainError, DomainEvent, Event, EventFields, Registrant,
    Registration, Snowflake, SnowflakeGenerator,
};
use temple_db::{
    MemoryCheckInRepository, MemoryEventRepository, MemoryHealthProbe,
    MemoryRegistrationRepository,
};

use super::context::ServiceContext;
use super::event::EventService;

/// Notifier that keeps every event for assertions
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingNotifier {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::event_type).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &DomainEvent) -> Result<(), DomainError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Notifier whose channel is always down
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _event: &DomainEvent) -> Result<(), DomainError> {
        Err(DomainError::NotificationError("channel unavailable".to_string()))
    }
}

/// Storage faults a test can switch on
#[derive(Debug, Default)]
pub struct Faults {
    undo: AtomicBool,
    update_of: Mutex<Option<Snowflake>>,
}

impl Faults {
    /// Make every check-in undo fail
    pub fn fail_undo(&self, fail: bool) {
        self.undo.store(fail, Ordering::SeqCst);
    }

    /// Make updates of one registration fail
    pub fn fail_update_of(&self, registration_id: Option<Snowflake>) {
        *self.update_of.lock() = registration_id;
    }

    fn disk_full() -> DomainError {
        DomainError::DatabaseError("disk full".to_string())
    }
}

/// Memory check-in store that honours [`Faults`]
struct FaultyCheckIns {
    inner: MemoryCheckInRepository,
    faults: Arc<Faults>,
}

#[async_trait]
impl CheckInRepository for FaultyCheckIns {
    async fn append(&self, record: &CheckInRecord) -> RepoResult<()> {
        self.inner.append(record).await
    }

    async fn undo(&self, current_id: Snowflake, undo: &CheckInRecord) -> RepoResult<()> {
        if self.faults.undo.load(Ordering::SeqCst) {
            return Err(Faults::disk_full());
        }
        self.inner.undo(current_id, undo).await
    }

    async fn current_for(&self, registration_id: Snowflake) -> RepoResult<Option<CheckInRecord>> {
        self.inner.current_for(registration_id).await
    }

    async fn history(&self, registration_id: Snowflake) -> RepoResult<Vec<CheckInRecord>> {
        self.inner.history(registration_id).await
    }

    async fn find_current_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<CheckInRecord>> {
        self.inner.find_current_by_event(event_id).await
    }
}

/// Memory registration store that honours [`Faults`]
struct FaultyRegistrations {
    inner: Arc<MemoryRegistrationRepository>,
    faults: Arc<Faults>,
}

#[async_trait]
impl RegistrationRepository for FaultyRegistrations {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Registration>> {
        self.inner.find_by_id(id).await
    }

    async fn create(&self, registration: &Registration) -> RepoResult<()> {
        self.inner.create(registration).await
    }

    async fn update(&self, registration: &Registration) -> RepoResult<()> {
        if *self.faults.update_of.lock() == Some(registration.id) {
            return Err(Faults::disk_full());
        }
        self.inner.update(registration).await
    }

    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<Registration>> {
        self.inner.find_by_event(event_id).await
    }

    async fn count_by_status(&self, event_id: Snowflake) -> RepoResult<StatusCounts> {
        self.inner.count_by_status(event_id).await
    }

    async fn oldest_waitlisted(&self, event_id: Snowflake) -> RepoResult<Option<Registration>> {
        self.inner.oldest_waitlisted(event_id).await
    }

    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Registration>> {
        self.inner.list(filter, page).await
    }
}

/// Memory-backed context plus direct handles on its stores
pub struct Harness {
    pub ctx: ServiceContext,
    pub registrations: Arc<MemoryRegistrationRepository>,
    pub notifier: RecordingNotifier,
    pub faults: Arc<Faults>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self::build(Arc::new(notifier.clone()), notifier)
    }

    pub fn failing_notifier() -> Self {
        Self::build(Arc::new(FailingNotifier), RecordingNotifier::default())
    }

    fn build(sink: Arc<dyn Notifier>, notifier: RecordingNotifier) -> Self {
        let registrations = Arc::new(MemoryRegistrationRepository::new());
        let faults = Arc::new(Faults::default());
        let ctx = ServiceContext::new(
            Arc::new(MemoryEventRepository::new()),
            Arc::new(FaultyRegistrations {
                inner: registrations.clone(),
                faults: faults.clone(),
            }),
            Arc::new(FaultyCheckIns {
                inner: MemoryCheckInRepository::new(),
                faults: faults.clone(),
            }),
            Arc::new(MemoryHealthProbe),
            sink,
            Arc::new(SnowflakeGenerator::new(1)),
            ListingConfig::default(),
        );
        Self {
            ctx,
            registrations,
            notifier,
            faults,
        }
    }

    /// Draft event opening in a week, registration closing a day before
    pub async fn draft_event(&self, capacity: Capacity) -> Event {
        EventService::new(&self.ctx)
            .create(Snowflake::new(1), fields(capacity), staff(), now())
            .await
            .unwrap()
    }

    pub async fn published_event(&self, capacity: Capacity) -> Event {
        let event = self.draft_event(capacity).await;
        EventService::new(&self.ctx)
            .publish(event.id, staff(), now())
            .await
            .unwrap()
    }
}

/// Fixed clock so schedule guards are deterministic
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// `now()` plus `minutes`
pub fn later(minutes: i64) -> DateTime<Utc> {
    now() + Duration::minutes(minutes)
}

pub fn staff() -> Actor {
    Actor::new("staff-1")
}

pub fn fields(capacity: Capacity) -> EventFields {
    let starts_at = now() + Duration::days(7);
    EventFields {
        title: "Spring Blessing".to_string(),
        description: "Seasonal blessing ceremony".to_string(),
        location: "Main Hall".to_string(),
        starts_at,
        ends_at: starts_at + Duration::hours(3),
        registration_closes_at: starts_at - Duration::days(1),
        capacity,
        fee_cents: 0,
        cover_asset: None,
    }
}

pub fn registrant(name: &str) -> Registrant {
    Registrant {
        name: name.to_string(),
        phone: "0912345678".to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        note: None,
    }
}
