//! In-memory implementation of RegistrationRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use temple_core::entities::Registration;
use temple_core::error::DomainError;
use temple_core::traits::{
    Page, PageRequest, RegistrationFilter, RegistrationRepository, RepoResult, StatusCounts,
};
use temple_core::value_objects::Snowflake;

use super::paginate;

#[derive(Clone, Debug, Default)]
pub struct MemoryRegistrationRepository {
    registrations: Arc<RwLock<HashMap<Snowflake, Registration>>>,
}

impl MemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored registration without any bookkeeping
    ///
    /// Lets tests put storage out of step with the ledger cache.
    pub fn force_put(&self, registration: Registration) {
        self.registrations
            .write()
            .insert(registration.id, registration);
    }

    fn of_event(&self, event_id: Snowflake) -> Vec<Registration> {
        let mut regs: Vec<Registration> = self
            .registrations
            .read()
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        regs.sort_by_key(Registration::queue_key);
        regs
    }
}

#[async_trait]
impl RegistrationRepository for MemoryRegistrationRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Registration>> {
        Ok(self.registrations.read().get(&id).cloned())
    }

    async fn create(&self, registration: &Registration) -> RepoResult<()> {
        let mut regs = self.registrations.write();
        if regs.contains_key(&registration.id) {
            return Err(DomainError::InternalError(format!(
                "duplicate registration id {}",
                registration.id
            )));
        }
        regs.insert(registration.id, registration.clone());
        Ok(())
    }

    async fn update(&self, registration: &Registration) -> RepoResult<()> {
        match self.registrations.write().get_mut(&registration.id) {
            Some(stored) => {
                stored.status = registration.status;
                stored.updated_at = registration.updated_at;
                stored.canceled_at = registration.canceled_at;
                Ok(())
            }
            None => Err(DomainError::RegistrationNotFound(registration.id)),
        }
    }

    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<Registration>> {
        Ok(self.of_event(event_id))
    }

    async fn count_by_status(&self, event_id: Snowflake) -> RepoResult<StatusCounts> {
        let mut counts = StatusCounts::default();
        for reg in self
            .registrations
            .read()
            .values()
            .filter(|r| r.event_id == event_id)
        {
            counts.add(reg.status);
        }
        Ok(counts)
    }

    async fn oldest_waitlisted(&self, event_id: Snowflake) -> RepoResult<Option<Registration>> {
        Ok(self
            .registrations
            .read()
            .values()
            .filter(|r| r.event_id == event_id && r.is_waitlisted())
            .min_by_key(|r| r.queue_key())
            .cloned())
    }

    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Registration>> {
        let mut matched: Vec<Registration> = self
            .registrations
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.queue_key().cmp(&a.queue_key()));
        Ok(paginate(matched, page))
    }
}
