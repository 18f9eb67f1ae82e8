//! Registration service
//!
//! Submissions, cancellations and staff status overrides. Admission is
//! decided by the capacity ledger alone: a well-formed submission inside the
//! registration window is never refused for lack of room, it is waitlisted.

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use temple_core::events::{
    RegistrationCanceledEvent, RegistrationCreatedEvent, RegistrationPromotedEvent,
};
use temple_core::{
    Actor, DomainError, DomainEvent, Event, EventStatus, Registrant, Registration,
    RegistrationSource, RegistrationStatus, Snowflake,
};

use super::check_in::{check_in_event, undo_locked};
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::ledger::LedgerGuard;

/// Outcome of a cancellation or status override
#[derive(Debug, Clone)]
pub struct RegistrationChange {
    pub registration: Registration,
    /// Waitlisted registration that took the freed seat
    pub promoted: Option<Registration>,
}

impl RegistrationChange {
    fn unchanged(registration: Registration) -> Self {
        Self {
            registration,
            promoted: None,
        }
    }
}

/// Registration service
pub struct RegistrationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RegistrationService<'a> {
    /// Create a new RegistrationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Self-service registration
    #[instrument(skip(self, registrant, user_id))]
    pub async fn submit(
        &self,
        event_id: Snowflake,
        registrant: Registrant,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Registration> {
        self.admit(event_id, registrant, user_id, RegistrationSource::SelfService, now)
            .await
    }

    /// Staff-entered registration
    ///
    /// Consumes capacity exactly like a self-service one.
    #[instrument(skip(self, registrant))]
    pub async fn manual_add(
        &self,
        event_id: Snowflake,
        registrant: Registrant,
        now: DateTime<Utc>,
    ) -> ServiceResult<Registration> {
        self.admit(event_id, registrant, None, RegistrationSource::StaffManual, now)
            .await
    }

    /// Get registration by ID
    #[instrument(skip(self))]
    pub async fn get(&self, registration_id: Snowflake) -> ServiceResult<Registration> {
        Ok(self
            .ctx
            .registration_repo()
            .find_by_id(registration_id)
            .await?
            .ok_or(DomainError::RegistrationNotFound(registration_id))?)
    }

    /// Cancel a registration and hand its seat to the waitlist
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        registration_id: Snowflake,
        now: DateTime<Utc>,
    ) -> ServiceResult<RegistrationChange> {
        let (mut guard, event, registration) = self.lock_registration(registration_id).await?;
        let mut notifications = Vec::new();
        let change = self
            .cancel_locked(&mut guard, &event, registration, now, &mut notifications)
            .await?;
        drop(guard);

        self.flush(notifications).await;
        Ok(change)
    }

    /// Staff override of a registration's status
    ///
    /// Setting the current status is a no-op. `canceled` behaves exactly
    /// like [`cancel`](Self::cancel). `waitlist → registered` needs a free
    /// seat. Every other change is refused.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        registration_id: Snowflake,
        status: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<RegistrationChange> {
        let (mut guard, event, mut registration) = self.lock_registration(registration_id).await?;
        if registration.status == status {
            return Ok(RegistrationChange::unchanged(registration));
        }

        let mut notifications = Vec::new();
        let change = match (registration.status, status) {
            (_, RegistrationStatus::Canceled) => {
                self.cancel_locked(&mut guard, &event, registration, now, &mut notifications)
                    .await?
            }
            (RegistrationStatus::Waitlist, RegistrationStatus::Registered) => {
                if !guard.has_room() {
                    return Err(DomainError::EventFull(guard.event_id()).into());
                }
                let staged = guard.promote()?;
                registration.promote(now)?;
                self.ctx.registration_repo().update(&registration).await?;
                guard.commit(staged);

                info!(
                    event_id = %registration.event_id,
                    registration_id = %registration_id,
                    confirmed = staged.confirmed,
                    "Waitlisted registration promoted by staff"
                );
                notifications.push(promoted_event(&registration, now));
                RegistrationChange::unchanged(registration)
            }
            (from, to) => return Err(DomainError::InvalidStatusChange { from, to }.into()),
        };
        drop(guard);

        self.flush(notifications).await;
        Ok(change)
    }

    async fn admit(
        &self,
        event_id: Snowflake,
        registrant: Registrant,
        user_id: Option<String>,
        source: RegistrationSource,
        now: DateTime<Utc>,
    ) -> ServiceResult<Registration> {
        registrant.validate()?;

        let (mut guard, event) = self.ctx.ledger().open(event_id).await?;
        if let Err(e) = event.ensure_accepting_registrations(now) {
            warn!(event_id = %event_id, status = %event.status, error = %e, "Registration refused");
            return Err(e.into());
        }

        // Seats left free by an earlier failed promotion go to the waitlist first
        let mut notifications = Vec::new();
        if guard.has_room() && guard.entry().waitlisted > 0 {
            for promoted in self.ctx.ledger().fill_from_waitlist(&mut guard, now).await? {
                notifications.push(promoted_event(&promoted, now));
            }
        }

        let (admission, staged) = guard.reserve();
        let registration = Registration::new(
            self.ctx.generate_id(),
            event_id,
            user_id,
            registrant,
            source,
            admission.status(),
            now,
        );
        self.ctx.registration_repo().create(&registration).await?;
        guard.commit(staged);
        drop(guard);
        self.flush(notifications).await;

        info!(
            event_id = %event_id,
            registration_id = %registration.id,
            status = %registration.status,
            source = %source,
            confirmed = staged.confirmed,
            waitlisted = staged.waitlisted,
            "Registration created"
        );
        self.ctx
            .notify(DomainEvent::RegistrationCreated(RegistrationCreatedEvent {
                registration_id: registration.id,
                event_id,
                status: registration.status,
                source,
                timestamp: now,
            }))
            .await;

        Ok(registration)
    }

    /// Lock the registration's event and reload the registration under it
    async fn lock_registration(
        &self,
        registration_id: Snowflake,
    ) -> ServiceResult<(LedgerGuard, Event, Registration)> {
        let event_id = self.get(registration_id).await?.event_id;
        let (guard, event) = self.ctx.ledger().open(event_id).await?;
        if event.status == EventStatus::Draft {
            return Err(DomainError::EventNotAcceptingRegistrations {
                event_id,
                reason: "event is not published",
            }
            .into());
        }
        let registration = self.get(registration_id).await?;
        Ok((guard, event, registration))
    }

    async fn cancel_locked(
        &self,
        guard: &mut LedgerGuard,
        event: &Event,
        mut registration: Registration,
        now: DateTime<Utc>,
        notifications: &mut Vec<DomainEvent>,
    ) -> ServiceResult<RegistrationChange> {
        if registration.is_canceled() {
            return Err(DomainError::AlreadyCanceled(registration.id).into());
        }

        // A canceled registrant cannot stay counted as present
        if registration.is_registered() {
            if let Some(undo) =
                undo_locked(self.ctx, guard, registration.id, Actor::system(), now).await?
            {
                notifications.push(DomainEvent::CheckInUndone(check_in_event(&undo)));
            }
        }

        let prior = registration.cancel(now)?;
        let staged = guard.release(prior)?;
        self.ctx.registration_repo().update(&registration).await?;
        guard.commit(staged);

        info!(
            event_id = %registration.event_id,
            registration_id = %registration.id,
            prior_status = %prior,
            "Registration canceled"
        );
        notifications.push(DomainEvent::RegistrationCanceled(RegistrationCanceledEvent {
            registration_id: registration.id,
            event_id: registration.event_id,
            prior_status: prior,
            timestamp: now,
        }));

        // A canceled event hands out no seats
        let promoted = if prior == RegistrationStatus::Registered
            && event.status != EventStatus::Canceled
        {
            // The cancellation is already stored; a failed promotion leaves the
            // seat free for the next admission to hand to the waitlist first
            match self.ctx.ledger().promote_one(guard, now).await {
                Ok(promoted) => promoted,
                Err(e) => {
                    error!(
                        event_id = %registration.event_id,
                        registration_id = %registration.id,
                        error = %e,
                        "Promotion after cancellation failed"
                    );
                    None
                }
            }
        } else {
            None
        };
        if let Some(promoted) = &promoted {
            notifications.push(promoted_event(promoted, now));
        }

        Ok(RegistrationChange {
            registration,
            promoted,
        })
    }

    async fn flush(&self, notifications: Vec<DomainEvent>) {
        for event in notifications {
            self.ctx.notify(event).await;
        }
    }
}

pub(crate) fn promoted_event(registration: &Registration, now: DateTime<Utc>) -> DomainEvent {
    DomainEvent::RegistrationPromoted(RegistrationPromotedEvent {
        registration_id: registration.id,
        event_id: registration.event_id,
        timestamp: now,
    })
}
