//! Check-in service
//!
//! Records attendance against registered registrations. Every toggle
//! appends a record; history is never rewritten beyond clearing the
//! `is_current` marker of the record being undone.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use temple_core::events::CheckInEvent;
use temple_core::{
    is_checked_in, Actor, CheckInRecord, DomainError, DomainEvent, Registration, Snowflake,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::ledger::LedgerGuard;

/// Check-in service
pub struct CheckInService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CheckInService<'a> {
    /// Create a new CheckInService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark a registered registrant as present
    ///
    /// Idempotent: when a current record exists it is returned unchanged.
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn check_in(
        &self,
        registration_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<CheckInRecord> {
        let event_id = self.find_registration(registration_id).await?.event_id;
        let (mut guard, event) = self.ctx.ledger().open(event_id).await?;
        let registration = self.find_registration(registration_id).await?;

        if !registration.is_registered() {
            warn!(
                registration_id = %registration_id,
                status = %registration.status,
                "Check-in refused for ineligible registration"
            );
            return Err(DomainError::IneligibleForCheckIn {
                registration_id,
                status: registration.status,
            }
            .into());
        }
        event.ensure_check_in_allowed()?;

        if let Some(current) = self.ctx.check_in_repo().current_for(registration_id).await? {
            debug!(registration_id = %registration_id, "Already checked in");
            return Ok(current);
        }

        let staged = guard.mark_checked_in()?;
        let record =
            CheckInRecord::checked_in(self.ctx.generate_id(), registration_id, event_id, actor, now);
        self.ctx.check_in_repo().append(&record).await?;
        guard.commit(staged);
        drop(guard);

        info!(
            event_id = %event_id,
            registration_id = %registration_id,
            checked_in = staged.checked_in,
            "Registrant checked in"
        );
        self.ctx
            .notify(DomainEvent::CheckedIn(check_in_event(&record)))
            .await;
        Ok(record)
    }

    /// Reverse the current check-in and return the appended undo record
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn undo_check_in(
        &self,
        registration_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<CheckInRecord> {
        let event_id = self.find_registration(registration_id).await?.event_id;
        let (mut guard, _) = self.ctx.ledger().open(event_id).await?;

        let record = undo_locked(self.ctx, &mut guard, registration_id, actor, now)
            .await?
            .ok_or(DomainError::NotCheckedIn(registration_id))?;
        drop(guard);

        self.ctx
            .notify(DomainEvent::CheckInUndone(check_in_event(&record)))
            .await;
        Ok(record)
    }

    /// Whether the latest record for the registration is a check-in
    #[instrument(skip(self))]
    pub async fn is_checked_in(&self, registration_id: Snowflake) -> ServiceResult<bool> {
        Ok(is_checked_in(&self.history(registration_id).await?))
    }

    /// Full audit trail, oldest first
    #[instrument(skip(self))]
    pub async fn history(&self, registration_id: Snowflake) -> ServiceResult<Vec<CheckInRecord>> {
        self.find_registration(registration_id).await?;
        Ok(self.ctx.check_in_repo().history(registration_id).await?)
    }

    async fn find_registration(&self, registration_id: Snowflake) -> ServiceResult<Registration> {
        Ok(self
            .ctx
            .registration_repo()
            .find_by_id(registration_id)
            .await?
            .ok_or(DomainError::RegistrationNotFound(registration_id))?)
    }
}

/// Supersede the current check-in of a registration and append an undo record
///
/// The caller holds the event's ledger guard. Returns `None` when the
/// registration is not checked in.
pub(crate) async fn undo_locked(
    ctx: &ServiceContext,
    guard: &mut LedgerGuard,
    registration_id: Snowflake,
    actor: Actor,
    now: DateTime<Utc>,
) -> ServiceResult<Option<CheckInRecord>> {
    let Some(current) = ctx.check_in_repo().current_for(registration_id).await? else {
        return Ok(None);
    };

    let staged = guard.unmark_checked_in()?;
    let undo = CheckInRecord::undone(
        ctx.generate_id(),
        registration_id,
        guard.event_id(),
        actor,
        now,
    );
    ctx.check_in_repo().undo(current.id, &undo).await?;
    guard.commit(staged);

    info!(
        event_id = %guard.event_id(),
        registration_id = %registration_id,
        checked_in = staged.checked_in,
        "Check-in undone"
    );
    Ok(Some(undo))
}

pub(crate) fn check_in_event(record: &CheckInRecord) -> CheckInEvent {
    CheckInEvent {
        registration_id: record.registration_id,
        event_id: record.event_id,
        record_id: record.id,
        actor: record.actor.clone(),
        timestamp: record.recorded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::event::EventService;
    use crate::services::registration::RegistrationService;
    use crate::services::test_support::{later, now, registrant, staff, Harness};
    use temple_core::{Capacity, CheckInAction};

    async fn registered(h: &Harness, capacity: Capacity) -> Registration {
        let event = h.published_event(capacity).await;
        RegistrationService::new(&h.ctx)
            .submit(event.id, registrant("Guest"), None, now())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_check_in_is_idempotent() {
        let h = Harness::new();
        let reg = registered(&h, Capacity::Limited(5)).await;
        let service = CheckInService::new(&h.ctx);

        let first = service.check_in(reg.id, staff(), later(1)).await.unwrap();
        let second = service.check_in(reg.id, Actor::new("door-2"), later(2)).await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_current);

        let snapshot = h.ctx.ledger().snapshot(reg.event_id).await.unwrap();
        assert_eq!(snapshot.checked_in_count, 1);
        assert_eq!(service.history(reg.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_check_in_then_undo() {
        let h = Harness::new();
        let reg = registered(&h, Capacity::Limited(5)).await;
        let service = CheckInService::new(&h.ctx);

        service.check_in(reg.id, staff(), later(1)).await.unwrap();
        assert!(service.is_checked_in(reg.id).await.unwrap());
        let snapshot = h.ctx.ledger().snapshot(reg.event_id).await.unwrap();
        assert_eq!(snapshot.checked_in_count, 1);

        let undo = service.undo_check_in(reg.id, staff(), later(2)).await.unwrap();
        assert_eq!(undo.action, CheckInAction::Undone);
        assert!(!undo.is_current);
        assert!(!service.is_checked_in(reg.id).await.unwrap());
        let snapshot = h.ctx.ledger().snapshot(reg.event_id).await.unwrap();
        assert_eq!(snapshot.checked_in_count, 0);

        let history = service.history(reg.id).await.unwrap();
        let actions: Vec<_> = history.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![CheckInAction::CheckedIn, CheckInAction::Undone]);
        assert!(history.iter().all(|r| !r.is_current));

        // Checking in again appends a fresh current record
        service.check_in(reg.id, staff(), later(3)).await.unwrap();
        assert_eq!(service.history(reg.id).await.unwrap().len(), 3);
        assert!(service.is_checked_in(reg.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_undo_keeps_check_in_current() {
        let h = Harness::new();
        let reg = registered(&h, Capacity::Limited(5)).await;
        let service = CheckInService::new(&h.ctx);
        service.check_in(reg.id, staff(), later(1)).await.unwrap();

        h.faults.fail_undo(true);
        let err = service.undo_check_in(reg.id, staff(), later(2)).await.unwrap_err();
        assert_eq!(err.status_code(), 500);

        assert!(service.is_checked_in(reg.id).await.unwrap());
        let history = service.history(reg.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_current);
        let snapshot = h.ctx.ledger().snapshot(reg.event_id).await.unwrap();
        assert_eq!(snapshot.checked_in_count, 1);
        assert!(h.ctx.ledger().verify(reg.event_id).await.unwrap().consistent);
        assert!(!h.notifier.event_types().contains(&"CHECK_IN_UNDONE"));

        h.faults.fail_undo(false);
        service.undo_check_in(reg.id, staff(), later(3)).await.unwrap();
        assert!(!service.is_checked_in(reg.id).await.unwrap());
        let snapshot = h.ctx.ledger().snapshot(reg.event_id).await.unwrap();
        assert_eq!(snapshot.checked_in_count, 0);
    }

    #[tokio::test]
    async fn test_undo_without_check_in_fails() {
        let h = Harness::new();
        let reg = registered(&h, Capacity::Unlimited).await;
        let err = CheckInService::new(&h.ctx)
            .undo_check_in(reg.id, staff(), later(1))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_CHECKED_IN");
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_waitlisted_and_canceled_are_ineligible() {
        let h = Harness::new();
        let event = h.published_event(Capacity::Limited(1)).await;
        let registrations = RegistrationService::new(&h.ctx);
        let service = CheckInService::new(&h.ctx);

        let seated = registrations.submit(event.id, registrant("Seated"), None, later(1)).await.unwrap();
        let waiting = registrations.submit(event.id, registrant("Waiting"), None, later(2)).await.unwrap();
        let err = service.check_in(waiting.id, staff(), later(3)).await.unwrap_err();
        assert_eq!(err.error_code(), "INELIGIBLE_FOR_CHECK_IN");

        registrations.cancel(seated.id, later(4)).await.unwrap();
        let err = service.check_in(seated.id, staff(), later(5)).await.unwrap_err();
        assert_eq!(err.error_code(), "INELIGIBLE_FOR_CHECK_IN");

        let snapshot = h.ctx.ledger().snapshot(event.id).await.unwrap();
        assert_eq!(snapshot.checked_in_count, 0);
        assert!(service.history(seated.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_in_follows_event_status() {
        let h = Harness::new();
        let reg = registered(&h, Capacity::Limited(5)).await;
        let events = EventService::new(&h.ctx);
        let service = CheckInService::new(&h.ctx);

        events.close(reg.event_id, staff(), later(1)).await.unwrap();
        service.check_in(reg.id, staff(), later(2)).await.unwrap();

        events.cancel(reg.event_id, staff(), later(3)).await.unwrap();
        service.undo_check_in(reg.id, staff(), later(4)).await.unwrap();
        let err = service.check_in(reg.id, staff(), later(5)).await.unwrap_err();
        assert_eq!(err.error_code(), "CHECK_IN_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_unknown_registration() {
        let h = Harness::new();
        let service = CheckInService::new(&h.ctx);
        let missing = Snowflake::new(9);
        assert_eq!(
            service.check_in(missing, staff(), now()).await.unwrap_err().status_code(),
            404
        );
        assert!(service.is_checked_in(missing).await.is_err());
    }

    #[tokio::test]
    async fn test_check_in_notifications() {
        let h = Harness::new();
        let reg = registered(&h, Capacity::Limited(5)).await;
        let service = CheckInService::new(&h.ctx);
        service.check_in(reg.id, staff(), later(1)).await.unwrap();
        service.check_in(reg.id, staff(), later(2)).await.unwrap();
        service.undo_check_in(reg.id, staff(), later(3)).await.unwrap();

        let types = h.notifier.event_types();
        assert_eq!(types.iter().filter(|t| **t == "CHECKED_IN").count(), 1);
        assert_eq!(types.last(), Some(&"CHECK_IN_UNDONE"));
    }
}
