//! In-memory implementation of EventRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use temple_core::entities::Event;
use temple_core::error::DomainError;
use temple_core::traits::{EventFilter, EventRepository, Page, PageRequest, RepoResult};
use temple_core::value_objects::Snowflake;

use super::paginate;

#[derive(Clone, Debug, Default)]
pub struct MemoryEventRepository {
    events: Arc<RwLock<HashMap<Snowflake, Event>>>,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Event>> {
        Ok(self.events.read().get(&id).cloned())
    }

    async fn create(&self, event: &Event) -> RepoResult<()> {
        let mut events = self.events.write();
        if events.contains_key(&event.id) {
            return Err(DomainError::InternalError(format!(
                "duplicate event id {}",
                event.id
            )));
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> RepoResult<()> {
        match self.events.write().get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(())
            }
            None => Err(DomainError::EventNotFound(event.id)),
        }
    }

    async fn list(&self, filter: &EventFilter, page: PageRequest) -> RepoResult<Page<Event>> {
        let mut matched: Vec<Event> = self
            .events
            .read()
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(paginate(matched, page))
    }
}
