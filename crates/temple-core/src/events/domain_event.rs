//! Domain events - emitted when event, registration or check-in state changes
//!
//! These events are handed to the `Notifier` port after the mutation has
//! been persisted. Delivery (push, email, message channels) happens outside
//! the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{EventStatus, RegistrationSource, RegistrationStatus};
use crate::value_objects::{Actor, Snowflake};

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Event Lifecycle
    // =========================================================================
    EventPublished(EventStatusChangedEvent),
    EventClosed(EventStatusChangedEvent),
    EventCanceled(EventStatusChangedEvent),

    // =========================================================================
    // Registrations
    // =========================================================================
    RegistrationCreated(RegistrationCreatedEvent),
    RegistrationCanceled(RegistrationCanceledEvent),
    RegistrationPromoted(RegistrationPromotedEvent),

    // =========================================================================
    // Check-in
    // =========================================================================
    CheckedIn(CheckInEvent),
    CheckInUndone(CheckInEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::EventPublished(_) => "EVENT_PUBLISHED",
            Self::EventClosed(_) => "EVENT_CLOSED",
            Self::EventCanceled(_) => "EVENT_CANCELED",
            Self::RegistrationCreated(_) => "REGISTRATION_CREATED",
            Self::RegistrationCanceled(_) => "REGISTRATION_CANCELED",
            Self::RegistrationPromoted(_) => "REGISTRATION_PROMOTED",
            Self::CheckedIn(_) => "CHECKED_IN",
            Self::CheckInUndone(_) => "CHECK_IN_UNDONE",
        }
    }

    /// Event the change belongs to
    pub fn event_id(&self) -> Snowflake {
        match self {
            Self::EventPublished(e) | Self::EventClosed(e) | Self::EventCanceled(e) => e.event_id,
            Self::RegistrationCreated(e) => e.event_id,
            Self::RegistrationCanceled(e) => e.event_id,
            Self::RegistrationPromoted(e) => e.event_id,
            Self::CheckedIn(e) | Self::CheckInUndone(e) => e.event_id,
        }
    }

    /// Build the lifecycle event matching the status the event moved to
    ///
    /// Returns `None` for `draft`, which is never a transition target.
    pub fn lifecycle(
        event_id: Snowflake,
        from: EventStatus,
        to: EventStatus,
        actor: Actor,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        let payload = EventStatusChangedEvent {
            event_id,
            from,
            to,
            actor,
            timestamp,
        };
        match to {
            EventStatus::Published => Some(Self::EventPublished(payload)),
            EventStatus::Closed => Some(Self::EventClosed(payload)),
            EventStatus::Canceled => Some(Self::EventCanceled(payload)),
            EventStatus::Draft => None,
        }
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStatusChangedEvent {
    pub event_id: Snowflake,
    pub from: EventStatus,
    pub to: EventStatus,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationCreatedEvent {
    pub registration_id: Snowflake,
    pub event_id: Snowflake,
    pub status: RegistrationStatus,
    pub source: RegistrationSource,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationCanceledEvent {
    pub registration_id: Snowflake,
    pub event_id: Snowflake,
    pub prior_status: RegistrationStatus,
    pub timestamp: DateTime<Utc>,
}

/// A waitlisted registrant now holds a confirmed seat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPromotedEvent {
    pub registration_id: Snowflake,
    pub event_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInEvent {
    pub registration_id: Snowflake,
    pub event_id: Snowflake,
    pub record_id: Snowflake,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = DomainEvent::RegistrationPromoted(RegistrationPromotedEvent {
            registration_id: Snowflake::new(2),
            event_id: Snowflake::new(1),
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "REGISTRATION_PROMOTED");
        assert_eq!(json["registration_id"], "2");
        assert_eq!(event.event_type(), "REGISTRATION_PROMOTED");
        assert_eq!(event.event_id(), Snowflake::new(1));
    }

    #[test]
    fn test_lifecycle_picks_variant() {
        let now = Utc::now();
        let e = DomainEvent::lifecycle(
            Snowflake::new(1),
            EventStatus::Published,
            EventStatus::Closed,
            Actor::system(),
            now,
        );
        assert!(matches!(e, Some(DomainEvent::EventClosed(_))));
        assert!(DomainEvent::lifecycle(
            Snowflake::new(1),
            EventStatus::Draft,
            EventStatus::Draft,
            Actor::system(),
            now
        )
        .is_none());
    }
}
