//! Notification adapters
//!
//! Delivery channels (push, email, message apps) live outside the engine.
//! The default adapter only records each domain event in the log.

use async_trait::async_trait;
use temple_core::traits::Notifier;
use temple_core::{DomainError, DomainEvent};
use tracing::info;

/// Notifier that logs domain events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| DomainError::NotificationError(e.to_string()))?;
        info!(
            event_type = event.event_type(),
            event_id = %event.event_id(),
            payload = %payload,
            "Domain event"
        );
        Ok(())
    }
}
