//! Event entity - a capacity-bounded, time-boxed activity and its publication lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{Actor, Capacity, Snowflake};

/// Publication status of an event
///
/// `draft → published → closed`, with `canceled` reachable from
/// `published` and `closed`. There is no way back to `published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Closed,
    Canceled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Closed => "closed",
            Self::Canceled => "canceled",
        }
    }

    /// Check whether the state machine has an edge from `self` to `next`
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published)
                | (Self::Published, Self::Closed)
                | (Self::Published, Self::Canceled)
                | (Self::Closed, Self::Canceled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Canceled)
    }

    /// Check-in is open to published and closed events
    pub fn allows_check_in(&self) -> bool {
        matches!(self, Self::Published | Self::Closed)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "closed" => Ok(Self::Closed),
            "canceled" => Ok(Self::Canceled),
            other => Err(DomainError::ValidationError(format!(
                "unknown event status '{other}'"
            ))),
        }
    }
}

/// Fields supplied when creating an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub registration_closes_at: DateTime<Utc>,
    pub capacity: Capacity,
    /// Fee in minor currency units
    pub fee_cents: i64,
    pub cover_asset: Option<String>,
}

/// Partial update of an event
///
/// `cover_asset: Some(None)` clears the cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub capacity: Option<Capacity>,
    pub fee_cents: Option<i64>,
    pub cover_asset: Option<Option<String>>,
}

impl EventPatch {
    /// Check whether the patch touches anything besides description and cover
    pub fn is_structural(&self) -> bool {
        self.title.is_some()
            || self.location.is_some()
            || self.starts_at.is_some()
            || self.ends_at.is_some()
            || self.registration_closes_at.is_some()
            || self.capacity.is_some()
            || self.fee_cents.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_structural() && self.description.is_none() && self.cover_asset.is_none()
    }
}

/// Event entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Snowflake,
    pub organization_id: Snowflake,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub registration_closes_at: DateTime<Utc>,
    pub capacity: Capacity,
    pub fee_cents: i64,
    pub cover_asset: Option<String>,
    pub status: EventStatus,
    pub created_by: Actor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new draft event
    ///
    /// # Errors
    /// Returns a validation error if the fields break the schedule, fee or text rules
    pub fn new(
        id: Snowflake,
        organization_id: Snowflake,
        fields: EventFields,
        created_by: Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let event = Self {
            id,
            organization_id,
            title: fields.title,
            description: fields.description,
            location: fields.location,
            starts_at: fields.starts_at,
            ends_at: fields.ends_at,
            registration_closes_at: fields.registration_closes_at,
            capacity: fields.capacity,
            fee_cents: fields.fee_cents,
            cover_asset: fields.cover_asset,
            status: EventStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the invariants every stored event satisfies
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::ValidationError(format!("{name} is required")));
            }
        }
        if self.starts_at >= self.ends_at {
            return Err(DomainError::InvalidSchedule(
                "end time must be after start time".to_string(),
            ));
        }
        if self.registration_closes_at > self.starts_at {
            return Err(DomainError::InvalidSchedule(
                "registration must close no later than the start time".to_string(),
            ));
        }
        if self.fee_cents < 0 {
            return Err(DomainError::NegativeFee(self.fee_cents));
        }
        Ok(())
    }

    /// Apply a partial update
    ///
    /// Drafts accept any field. Published and closed events only accept
    /// description and cover changes. Canceled events accept nothing.
    /// On error the event is left unchanged.
    pub fn apply_patch(&mut self, patch: EventPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        match self.status {
            EventStatus::Draft => {}
            EventStatus::Published | EventStatus::Closed if !patch.is_structural() => {}
            status => {
                return Err(DomainError::EventNotEditable {
                    event_id: self.id,
                    status,
                })
            }
        }

        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(location) = patch.location {
            next.location = location;
        }
        if let Some(starts_at) = patch.starts_at {
            next.starts_at = starts_at;
        }
        if let Some(ends_at) = patch.ends_at {
            next.ends_at = ends_at;
        }
        if let Some(closes_at) = patch.registration_closes_at {
            next.registration_closes_at = closes_at;
        }
        if let Some(capacity) = patch.capacity {
            next.capacity = capacity;
        }
        if let Some(fee_cents) = patch.fee_cents {
            next.fee_cents = fee_cents;
        }
        if let Some(cover_asset) = patch.cover_asset {
            next.cover_asset = cover_asset;
        }
        next.validate()?;
        next.updated_at = now;

        *self = next;
        Ok(())
    }

    /// Move the event along the publication state machine
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` naming both states when no edge exists
    pub fn transition(&mut self, to: EventStatus, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        if to == EventStatus::Published {
            self.validate()?;
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(EventStatus::Published, now)
    }

    pub fn close(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(EventStatus::Closed, now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(EventStatus::Canceled, now)
    }

    /// Check whether a registration submitted at `now` may be accepted
    ///
    /// # Errors
    /// Returns `DomainError::EventNotAcceptingRegistrations` with the reason
    pub fn ensure_accepting_registrations(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let reason = match self.status {
            EventStatus::Published if now <= self.registration_closes_at => return Ok(()),
            EventStatus::Published => "registration window has closed",
            EventStatus::Draft => "event is not published",
            EventStatus::Closed => "event is closed",
            EventStatus::Canceled => "event is canceled",
        };
        Err(DomainError::EventNotAcceptingRegistrations {
            event_id: self.id,
            reason,
        })
    }

    /// Check whether attendance may be recorded
    pub fn ensure_check_in_allowed(&self) -> Result<(), DomainError> {
        if self.status.allows_check_in() {
            Ok(())
        } else {
            Err(DomainError::CheckInNotAllowed {
                event_id: self.id,
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, hour, 0, 0).unwrap()
    }

    fn fields() -> EventFields {
        EventFields {
            title: "Lantern Festival Blessing".to_string(),
            description: "Evening prayer and lantern lighting".to_string(),
            location: "Main Hall".to_string(),
            starts_at: at(18),
            ends_at: at(21),
            registration_closes_at: at(12),
            capacity: Capacity::Limited(30),
            fee_cents: 0,
            cover_asset: None,
        }
    }

    fn draft() -> Event {
        Event::new(
            Snowflake::new(1),
            Snowflake::new(10),
            fields(),
            Actor::new("staff-1"),
            at(8),
        )
        .unwrap()
    }

    #[test]
    fn test_new_event_is_draft() {
        let event = draft();
        assert_eq!(event.status, EventStatus::Draft);
        assert_eq!(event.created_at, at(8));
    }

    #[test]
    fn test_schedule_invariants() {
        let mut f = fields();
        f.ends_at = f.starts_at;
        let err = Event::new(Snowflake::new(1), Snowflake::new(1), f, Actor::system(), at(8));
        assert!(matches!(err, Err(DomainError::InvalidSchedule(_))));

        let mut f = fields();
        f.registration_closes_at = f.starts_at + Duration::minutes(1);
        let err = Event::new(Snowflake::new(1), Snowflake::new(1), f, Actor::system(), at(8));
        assert!(matches!(err, Err(DomainError::InvalidSchedule(_))));

        let mut f = fields();
        f.fee_cents = -1;
        let err = Event::new(Snowflake::new(1), Snowflake::new(1), f, Actor::system(), at(8));
        assert!(matches!(err, Err(DomainError::NegativeFee(-1))));
    }

    #[test]
    fn test_registration_may_close_exactly_at_start() {
        let mut f = fields();
        f.registration_closes_at = f.starts_at;
        assert!(Event::new(Snowflake::new(1), Snowflake::new(1), f, Actor::system(), at(8)).is_ok());
    }

    #[test]
    fn test_transition_table() {
        use EventStatus::*;
        let all = [Draft, Published, Closed, Canceled];
        let allowed = [
            (Draft, Published),
            (Published, Closed),
            (Published, Canceled),
            (Closed, Canceled),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_closed_cannot_reopen() {
        let mut event = draft();
        event.publish(at(9)).unwrap();
        event.close(at(10)).unwrap();

        let err = event.publish(at(11)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: EventStatus::Closed,
                to: EventStatus::Published
            }
        ));
        assert_eq!(event.status, EventStatus::Closed);
        assert_eq!(event.updated_at, at(10));
    }

    #[test]
    fn test_draft_cannot_be_canceled() {
        let mut event = draft();
        assert!(event.cancel(at(9)).is_err());
    }

    #[test]
    fn test_registration_window() {
        let mut event = draft();
        assert!(event.ensure_accepting_registrations(at(9)).is_err());

        event.publish(at(9)).unwrap();
        assert!(event.ensure_accepting_registrations(at(10)).is_ok());
        assert!(event.ensure_accepting_registrations(at(12)).is_ok());
        let err = event
            .ensure_accepting_registrations(at(12) + Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err.code(), "EVENT_NOT_ACCEPTING_REGISTRATIONS");
    }

    #[test]
    fn test_check_in_allowed_only_when_published_or_closed() {
        let mut event = draft();
        assert!(event.ensure_check_in_allowed().is_err());
        event.publish(at(9)).unwrap();
        assert!(event.ensure_check_in_allowed().is_ok());
        event.close(at(10)).unwrap();
        assert!(event.ensure_check_in_allowed().is_ok());
        event.cancel(at(11)).unwrap();
        assert!(event.ensure_check_in_allowed().is_err());
    }

    #[test]
    fn test_draft_patch_revalidates_merged_fields() {
        let mut event = draft();
        let patch = EventPatch {
            starts_at: Some(at(22)),
            ..Default::default()
        };
        assert!(matches!(
            event.apply_patch(patch, at(9)),
            Err(DomainError::InvalidSchedule(_))
        ));
        assert_eq!(event.starts_at, at(18));

        let patch = EventPatch {
            capacity: Some(Capacity::Unlimited),
            fee_cents: Some(50_000),
            ..Default::default()
        };
        event.apply_patch(patch, at(9)).unwrap();
        assert!(event.capacity.is_unlimited());
        assert_eq!(event.fee_cents, 50_000);
        assert_eq!(event.updated_at, at(9));
    }

    #[test]
    fn test_published_accepts_only_non_structural_patch() {
        let mut event = draft();
        event.publish(at(9)).unwrap();

        let patch = EventPatch {
            capacity: Some(Capacity::Limited(10)),
            ..Default::default()
        };
        assert!(matches!(
            event.apply_patch(patch, at(10)),
            Err(DomainError::EventNotEditable { .. })
        ));

        let patch = EventPatch {
            description: Some("Bring your own lantern".to_string()),
            cover_asset: Some(Some("covers/lantern.jpg".to_string())),
            ..Default::default()
        };
        event.apply_patch(patch, at(10)).unwrap();
        assert_eq!(event.cover_asset.as_deref(), Some("covers/lantern.jpg"));
    }

    #[test]
    fn test_canceled_rejects_all_patches() {
        let mut event = draft();
        event.publish(at(9)).unwrap();
        event.cancel(at(10)).unwrap();
        let patch = EventPatch {
            description: Some("x".to_string()),
            ..Default::default()
        };
        assert!(event.apply_patch(patch, at(11)).is_err());
    }

    #[test]
    fn test_status_round_trip_str() {
        for status in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::Closed,
            EventStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
        assert!("archived".parse::<EventStatus>().is_err());
    }
}
