//! Notification port - receives domain events once a mutation is persisted

use async_trait::async_trait;

use crate::error::DomainError;
use crate::events::DomainEvent;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hand an event to the delivery collaborator
    async fn notify(&self, event: &DomainEvent) -> Result<(), DomainError>;
}
