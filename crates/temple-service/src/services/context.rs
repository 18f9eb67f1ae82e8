//! Service context - dependency container for services
//!
//! Holds the repositories, the capacity ledger, the notifier and the id
//! generator needed by services.

use std::sync::Arc;

use temple_common::ListingConfig;
use temple_core::traits::{
    CheckInRepository, EventRepository, HealthProbe, Notifier, RegistrationRepository,
};
use temple_core::{DomainEvent, Snowflake, SnowflakeGenerator};
use temple_db::{
    MemoryCheckInRepository, MemoryEventRepository, MemoryHealthProbe,
    MemoryRegistrationRepository, PgCheckInRepository, PgEventRepository, PgHealthProbe, PgPool,
    PgRegistrationRepository,
};
use tracing::warn;

use super::error::{ServiceError, ServiceResult};
use super::ledger::CapacityLedger;
use super::notify::TracingNotifier;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// Cloning is cheap and every clone shares the same ledger, so one context
/// per process keeps admission decisions serialized per event.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    event_repo: Arc<dyn EventRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
    check_in_repo: Arc<dyn CheckInRepository>,
    health_probe: Arc<dyn HealthProbe>,

    // Engine state
    ledger: Arc<CapacityLedger>,

    // Collaborators
    notifier: Arc<dyn Notifier>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    listing: ListingConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        registration_repo: Arc<dyn RegistrationRepository>,
        check_in_repo: Arc<dyn CheckInRepository>,
        health_probe: Arc<dyn HealthProbe>,
        notifier: Arc<dyn Notifier>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        listing: ListingConfig,
    ) -> Self {
        let ledger = Arc::new(CapacityLedger::new(
            event_repo.clone(),
            registration_repo.clone(),
            check_in_repo.clone(),
        ));

        Self {
            event_repo,
            registration_repo,
            check_in_repo,
            health_probe,
            ledger,
            notifier,
            snowflake_generator,
            listing,
        }
    }

    /// Context over fresh in-memory repositories
    pub fn in_memory(worker_id: u16) -> Self {
        Self::new(
            Arc::new(MemoryEventRepository::new()),
            Arc::new(MemoryRegistrationRepository::new()),
            Arc::new(MemoryCheckInRepository::new()),
            Arc::new(MemoryHealthProbe),
            Arc::new(TracingNotifier),
            Arc::new(SnowflakeGenerator::new(worker_id)),
            ListingConfig::default(),
        )
    }

    // === Repositories ===

    /// Get the event repository
    pub fn event_repo(&self) -> &dyn EventRepository {
        self.event_repo.as_ref()
    }

    /// Get the registration repository
    pub fn registration_repo(&self) -> &dyn RegistrationRepository {
        self.registration_repo.as_ref()
    }

    /// Get the check-in repository
    pub fn check_in_repo(&self) -> &dyn CheckInRepository {
        self.check_in_repo.as_ref()
    }

    /// Get the storage health probe
    pub fn health_probe(&self) -> &dyn HealthProbe {
        self.health_probe.as_ref()
    }

    // === Engine ===

    /// Get the capacity ledger
    pub fn ledger(&self) -> &CapacityLedger {
        self.ledger.as_ref()
    }

    /// Listing page size limits
    pub fn listing(&self) -> &ListingConfig {
        &self.listing
    }

    // === Collaborators ===

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Hand a domain event to the notifier
    ///
    /// Delivery failures are logged and swallowed; the state change they
    /// describe is already persisted.
    pub async fn notify(&self, event: DomainEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            warn!(
                event_type = event.event_type(),
                event_id = %event.event_id(),
                error = %e,
                "Notification delivery failed"
            );
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("ledger", &self.ledger)
            .field("listing", &self.listing)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    event_repo: Option<Arc<dyn EventRepository>>,
    registration_repo: Option<Arc<dyn RegistrationRepository>>,
    check_in_repo: Option<Arc<dyn CheckInRepository>>,
    health_probe: Option<Arc<dyn HealthProbe>>,
    notifier: Option<Arc<dyn Notifier>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    listing: ListingConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            event_repo: None,
            registration_repo: None,
            check_in_repo: None,
            health_probe: None,
            notifier: None,
            snowflake_generator: None,
            listing: ListingConfig::default(),
        }
    }

    /// Use PostgreSQL repositories over one pool
    pub fn postgres(self, pool: PgPool) -> Self {
        self.event_repo(Arc::new(PgEventRepository::new(pool.clone())))
            .registration_repo(Arc::new(PgRegistrationRepository::new(pool.clone())))
            .check_in_repo(Arc::new(PgCheckInRepository::new(pool.clone())))
            .health_probe(Arc::new(PgHealthProbe::new(pool)))
    }

    /// Use fresh in-memory repositories
    pub fn memory(self) -> Self {
        self.event_repo(Arc::new(MemoryEventRepository::new()))
            .registration_repo(Arc::new(MemoryRegistrationRepository::new()))
            .check_in_repo(Arc::new(MemoryCheckInRepository::new()))
            .health_probe(Arc::new(MemoryHealthProbe))
    }

    pub fn event_repo(mut self, repo: Arc<dyn EventRepository>) -> Self {
        self.event_repo = Some(repo);
        self
    }

    pub fn registration_repo(mut self, repo: Arc<dyn RegistrationRepository>) -> Self {
        self.registration_repo = Some(repo);
        self
    }

    pub fn check_in_repo(mut self, repo: Arc<dyn CheckInRepository>) -> Self {
        self.check_in_repo = Some(repo);
        self
    }

    pub fn health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.health_probe = Some(probe);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn listing(mut self, listing: ListingConfig) -> Self {
        self.listing = listing;
        self
    }

    /// Build the ServiceContext
    ///
    /// The notifier defaults to [`TracingNotifier`].
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.event_repo
                .ok_or_else(|| ServiceError::validation("event_repo is required"))?,
            self.registration_repo
                .ok_or_else(|| ServiceError::validation("registration_repo is required"))?,
            self.check_in_repo
                .ok_or_else(|| ServiceError::validation("check_in_repo is required"))?,
            self.health_probe
                .ok_or_else(|| ServiceError::validation("health_probe is required"))?,
            self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            self.listing,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
