//! Event entity <-> model mapper

use temple_core::entities::{Event, EventStatus};
use temple_core::error::DomainError;
use temple_core::value_objects::{Actor, Capacity, Snowflake};

use crate::models::EventModel;

/// Convert EventModel to Event entity
///
/// Fails when a stored status or capacity is outside the domain's range.
impl TryFrom<EventModel> for Event {
    type Error = DomainError;

    fn try_from(model: EventModel) -> Result<Self, Self::Error> {
        Ok(Event {
            id: Snowflake::new(model.id),
            organization_id: Snowflake::new(model.organization_id),
            title: model.title,
            description: model.description,
            location: model.location,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            registration_closes_at: model.registration_closes_at,
            capacity: Capacity::try_from(model.capacity.map(i64::from))?,
            fee_cents: model.fee_cents,
            cover_asset: model.cover_asset,
            status: model.status.parse()?,
            created_by: Actor::new(model.created_by),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Event values that need conversion before binding
pub struct EventRow {
    pub id: i64,
    pub organization_id: i64,
    pub capacity: Option<i32>,
    pub status: &'static str,
}

impl EventRow {
    pub fn new(event: &Event) -> Self {
        Self {
            id: event.id.into_inner(),
            organization_id: event.organization_id.into_inner(),
            capacity: capacity_to_column(event.capacity),
            status: status_to_str(event.status),
        }
    }
}

/// Limited capacities always fit: the domain caps them at `u32`, the column at `i32`
pub fn capacity_to_column(capacity: Capacity) -> Option<i32> {
    capacity
        .limit()
        .map(|n| i32::try_from(n).unwrap_or(i32::MAX))
}

pub fn status_to_str(status: EventStatus) -> &'static str {
    status.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model() -> EventModel {
        let now = Utc::now();
        EventModel {
            id: 1,
            organization_id: 2,
            title: "Dharma talk".to_string(),
            description: "Weekly talk".to_string(),
            location: "Hall B".to_string(),
            starts_at: now,
            ends_at: now,
            registration_closes_at: now,
            capacity: None,
            fee_cents: 0,
            cover_asset: None,
            status: "published".to_string(),
            created_by: "staff-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_model_to_entity() {
        let event = Event::try_from(model()).unwrap();
        assert!(event.capacity.is_unlimited());
        assert_eq!(event.status, EventStatus::Published);
        assert_eq!(event.created_by.as_str(), "staff-1");
    }

    #[test]
    fn test_bad_rows_rejected() {
        let mut m = model();
        m.status = "archived".to_string();
        assert!(Event::try_from(m).is_err());

        let mut m = model();
        m.capacity = Some(0);
        assert!(Event::try_from(m).is_err());
    }

    #[test]
    fn test_capacity_column() {
        assert_eq!(capacity_to_column(Capacity::Unlimited), None);
        assert_eq!(capacity_to_column(Capacity::Limited(40)), Some(40));
        assert_eq!(capacity_to_column(Capacity::Limited(u32::MAX)), Some(i32::MAX));
    }
}
