//! In-memory implementation of CheckInRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use temple_core::entities::CheckInRecord;
use temple_core::error::DomainError;
use temple_core::traits::{CheckInRepository, RepoResult};
use temple_core::value_objects::Snowflake;

/// Append-only record log, kept in insertion order
#[derive(Clone, Debug, Default)]
pub struct MemoryCheckInRepository {
    records: Arc<RwLock<Vec<CheckInRecord>>>,
}

impl MemoryCheckInRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl CheckInRepository for MemoryCheckInRepository {
    async fn append(&self, record: &CheckInRecord) -> RepoResult<()> {
        let mut records = self.records.write();
        if record.is_current
            && records
                .iter()
                .any(|r| r.registration_id == record.registration_id && r.is_current)
        {
            return Err(DomainError::InternalError(format!(
                "registration {} already has a current check-in",
                record.registration_id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn undo(&self, current_id: Snowflake, undo: &CheckInRecord) -> RepoResult<()> {
        let mut records = self.records.write();
        let Some(current) = records.iter_mut().find(|r| r.id == current_id && r.is_current) else {
            return Err(DomainError::InternalError(format!(
                "check-in record {current_id} is not current"
            )));
        };
        current.is_current = false;
        records.push(undo.clone());
        Ok(())
    }

    async fn current_for(&self, registration_id: Snowflake) -> RepoResult<Option<CheckInRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.registration_id == registration_id && r.is_current)
            .cloned())
    }

    async fn history(&self, registration_id: Snowflake) -> RepoResult<Vec<CheckInRecord>> {
        let mut history: Vec<_> = self
            .records
            .read()
            .iter()
            .filter(|r| r.registration_id == registration_id)
            .cloned()
            .collect();
        // Ids grow in append order, whatever clock the caller supplied
        history.sort_by_key(|r| r.id);
        Ok(history)
    }

    async fn find_current_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<CheckInRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.event_id == event_id && r.is_current)
            .cloned()
            .collect())
    }
}
