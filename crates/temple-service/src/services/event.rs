//! Event service
//!
//! Handles event creation, edits and the publication state machine.
//! Every change runs under the event's ledger lock so a transition can never
//! interleave with an admission decision for the same event.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use temple_core::{
    Actor, Capacity, DomainError, DomainEvent, Event, EventFields, EventPatch, EventStatus,
    Registration, Snowflake,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::ledger::LedgerSnapshot;
use super::registration::promoted_event;

/// Outcome of a capacity change
#[derive(Debug, Clone)]
pub struct CapacityChange {
    pub event: Event,
    pub ledger: LedgerSnapshot,
    /// Waitlisted registrations moved into the new room, oldest first
    pub promoted: Vec<Registration>,
}

/// Event service
pub struct EventService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventService<'a> {
    /// Create a new EventService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a draft event
    #[instrument(skip(self, fields), fields(title = %fields.title))]
    pub async fn create(
        &self,
        organization_id: Snowflake,
        fields: EventFields,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Event> {
        let event = Event::new(self.ctx.generate_id(), organization_id, fields, actor, now)?;
        self.ctx.event_repo().create(&event).await?;

        info!(
            event_id = %event.id,
            organization_id = %organization_id,
            capacity = %event.capacity,
            "Event created"
        );
        Ok(event)
    }

    /// Get event by ID
    #[instrument(skip(self))]
    pub async fn get(&self, event_id: Snowflake) -> ServiceResult<Event> {
        Ok(self
            .ctx
            .event_repo()
            .find_by_id(event_id)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?)
    }

    /// Apply a partial edit
    ///
    /// A capacity change in a draft goes through the ledger resize check.
    #[instrument(skip(self, patch))]
    pub async fn edit(
        &self,
        event_id: Snowflake,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> ServiceResult<Event> {
        let (mut guard, mut event) = self.ctx.ledger().open(event_id).await?;

        let resized = patch.capacity;
        event.apply_patch(patch, now)?;
        let staged = match resized {
            Some(capacity) => Some(guard.resize(capacity)?),
            None => None,
        };

        self.ctx.event_repo().update(&event).await?;
        if let Some(staged) = staged {
            guard.commit(staged);
        }

        info!(event_id = %event_id, status = %event.status, "Event updated");
        Ok(event)
    }

    /// Change capacity through the ledger
    ///
    /// Allowed while draft or published. Shrinking below the confirmed count
    /// fails; growing promotes waitlisted registrations into the new room.
    #[instrument(skip(self))]
    pub async fn resize_capacity(
        &self,
        event_id: Snowflake,
        capacity: Capacity,
        now: DateTime<Utc>,
    ) -> ServiceResult<CapacityChange> {
        let (mut guard, mut event) = self.ctx.ledger().open(event_id).await?;

        if !matches!(event.status, EventStatus::Draft | EventStatus::Published) {
            return Err(DomainError::EventNotEditable {
                event_id,
                status: event.status,
            }
            .into());
        }

        let staged = guard.resize(capacity)?;
        event.capacity = capacity;
        event.updated_at = now;
        self.ctx.event_repo().update(&event).await?;
        guard.commit(staged);

        let promoted = self.ctx.ledger().fill_from_waitlist(&mut guard, now).await?;
        let ledger = guard.snapshot();
        drop(guard);

        info!(
            event_id = %event_id,
            capacity = %capacity,
            promoted = promoted.len(),
            "Event capacity changed"
        );
        for registration in &promoted {
            self.ctx.notify(promoted_event(registration, now)).await;
        }

        Ok(CapacityChange {
            event,
            ledger,
            promoted,
        })
    }

    /// Open a draft for registration
    pub async fn publish(
        &self,
        event_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Event> {
        self.transition(event_id, EventStatus::Published, actor, now).await
    }

    /// Stop accepting registrations; check-in stays open
    pub async fn close(
        &self,
        event_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Event> {
        self.transition(event_id, EventStatus::Closed, actor, now).await
    }

    /// Cancel a published or closed event
    ///
    /// Registrations keep their status; the ledger stays as it was.
    pub async fn cancel(
        &self,
        event_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Event> {
        self.transition(event_id, EventStatus::Canceled, actor, now).await
    }

    #[instrument(skip(self, actor), fields(actor = %actor))]
    async fn transition(
        &self,
        event_id: Snowflake,
        to: EventStatus,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<Event> {
        let (guard, mut event) = self.ctx.ledger().open(event_id).await?;

        let from = event.status;
        event.transition(to, now)?;
        self.ctx.event_repo().update(&event).await?;
        drop(guard);

        info!(event_id = %event_id, from = %from, to = %to, "Event status changed");
        if let Some(domain_event) = DomainEvent::lifecycle(event_id, from, to, actor, now) {
            self.ctx.notify(domain_event).await;
        }
        Ok(event)
    }
}
