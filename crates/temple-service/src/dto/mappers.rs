//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use temple_core::entities::{CheckInRecord, Event, Registration};
use temple_core::Page;

use crate::services::{CapacityChange, EventSummary, RegistrationChange};

use super::responses::{
    CapacityChangeResponse, CheckInRecordResponse, EventResponse, EventSummaryResponse,
    PaginatedResponse, PaginationMeta, RegistrationChangeResponse, RegistrationResponse,
};

// ============================================================================
// Event Mappers
// ============================================================================

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            organization_id: event.organization_id.to_string(),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            registration_closes_at: event.registration_closes_at,
            capacity: event.capacity.limit(),
            fee_cents: event.fee_cents,
            cover_asset: event.cover_asset.clone(),
            status: event.status,
            created_by: event.created_by.as_str().to_string(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self::from(&event)
    }
}

impl From<EventSummary> for EventSummaryResponse {
    fn from(summary: EventSummary) -> Self {
        Self {
            event: EventResponse::from(&summary.event),
            confirmed_count: summary.confirmed_count,
        }
    }
}

impl From<CapacityChange> for CapacityChangeResponse {
    fn from(change: CapacityChange) -> Self {
        Self {
            event: EventResponse::from(&change.event),
            ledger: change.ledger,
            promoted: change.promoted.iter().map(RegistrationResponse::from).collect(),
        }
    }
}

// ============================================================================
// Registration Mappers
// ============================================================================

impl From<&Registration> for RegistrationResponse {
    fn from(registration: &Registration) -> Self {
        Self {
            id: registration.id.to_string(),
            event_id: registration.event_id.to_string(),
            user_id: registration.user_id.clone(),
            name: registration.registrant.name.clone(),
            phone: registration.registrant.phone.clone(),
            email: registration.registrant.email.clone(),
            note: registration.registrant.note.clone(),
            source: registration.source,
            status: registration.status,
            created_at: registration.created_at,
            updated_at: registration.updated_at,
            canceled_at: registration.canceled_at,
        }
    }
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self::from(&registration)
    }
}

impl From<RegistrationChange> for RegistrationChangeResponse {
    fn from(change: RegistrationChange) -> Self {
        Self {
            registration: RegistrationResponse::from(&change.registration),
            promoted: change.promoted.as_ref().map(RegistrationResponse::from),
        }
    }
}

// ============================================================================
// Check-in Mappers
// ============================================================================

impl From<&CheckInRecord> for CheckInRecordResponse {
    fn from(record: &CheckInRecord) -> Self {
        Self {
            id: record.id.to_string(),
            registration_id: record.registration_id.to_string(),
            event_id: record.event_id.to_string(),
            action: record.action,
            actor: record.actor.as_str().to_string(),
            is_current: record.is_current,
            recorded_at: record.recorded_at,
        }
    }
}

impl From<CheckInRecord> for CheckInRecordResponse {
    fn from(record: CheckInRecord) -> Self {
        Self::from(&record)
    }
}

// ============================================================================
// Pagination Mappers
// ============================================================================

impl<T> PaginatedResponse<T> {
    /// Map each row of a page into its response type
    pub fn from_page<U>(page: Page<U>) -> Self
    where
        T: From<U>,
    {
        Self::from(page.map(T::from))
    }
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = PaginationMeta {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.items,
            pagination,
        }
    }
}
