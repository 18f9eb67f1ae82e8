//! Capacity ledger
//!
//! Per-event counters (confirmed, waitlisted, checked in) and the single
//! place where admission is decided. The counters are a cache over the
//! registration and check-in tables and can always be rebuilt by a full scan.
//!
//! Every mutation of an event's registrations or check-ins runs while
//! holding that event's [`LedgerGuard`]. Callers stage the next counter
//! values, persist the matching rows, then `commit`; a failed write leaves
//! the cached counters untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, instrument, warn};

use temple_core::traits::{CheckInRepository, EventRepository, RegistrationRepository};
use temple_core::{Capacity, DomainError, Event, Registration, RegistrationStatus, Snowflake};

use super::error::ServiceResult;

// ============================================================================
// Ledger Entry
// ============================================================================

/// Outcome of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Admission {
    Confirmed,
    Waitlisted,
}

impl Admission {
    pub fn status(self) -> RegistrationStatus {
        match self {
            Self::Confirmed => RegistrationStatus::Registered,
            Self::Waitlisted => RegistrationStatus::Waitlist,
        }
    }
}

/// Cached counters for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub capacity: Capacity,
    pub confirmed: u32,
    pub waitlisted: u32,
    pub checked_in: u32,
}

impl LedgerEntry {
    pub fn empty(capacity: Capacity) -> Self {
        Self {
            capacity,
            confirmed: 0,
            waitlisted: 0,
            checked_in: 0,
        }
    }

    /// Admit one registrant, confirmed while there is room
    pub fn reserve(&self) -> (Admission, Self) {
        let mut next = *self;
        if self.capacity.has_room(self.confirmed) {
            next.confirmed += 1;
            (Admission::Confirmed, next)
        } else {
            next.waitlisted += 1;
            (Admission::Waitlisted, next)
        }
    }

    /// Vacate the slot a registration held before cancellation
    pub fn release(&self, event_id: Snowflake, prior: RegistrationStatus) -> Result<Self, DomainError> {
        let mut next = *self;
        match prior {
            RegistrationStatus::Registered => {
                next.confirmed = self
                    .confirmed
                    .checked_sub(1)
                    .ok_or_else(|| DomainError::ledger(event_id, "confirmed count would go negative"))?;
            }
            RegistrationStatus::Waitlist => {
                next.waitlisted = self
                    .waitlisted
                    .checked_sub(1)
                    .ok_or_else(|| DomainError::ledger(event_id, "waitlist count would go negative"))?;
            }
            RegistrationStatus::Canceled => {
                return Err(DomainError::ledger(event_id, "a canceled registration holds no slot"));
            }
        }
        next.check(event_id)?;
        Ok(next)
    }

    /// Move one registrant from the waitlist into a confirmed seat
    pub fn promote(&self, event_id: Snowflake) -> Result<Self, DomainError> {
        if self.waitlisted == 0 {
            return Err(DomainError::ledger(event_id, "promotion with an empty waitlist"));
        }
        if !self.capacity.has_room(self.confirmed) {
            return Err(DomainError::ledger(event_id, "promotion would exceed capacity"));
        }
        Ok(Self {
            confirmed: self.confirmed + 1,
            waitlisted: self.waitlisted - 1,
            ..*self
        })
    }

    pub fn mark_checked_in(&self, event_id: Snowflake) -> Result<Self, DomainError> {
        if self.checked_in >= self.confirmed {
            return Err(DomainError::ledger(
                event_id,
                format!(
                    "checked-in count {} would exceed confirmed count {}",
                    self.checked_in + 1,
                    self.confirmed
                ),
            ));
        }
        Ok(Self {
            checked_in: self.checked_in + 1,
            ..*self
        })
    }

    pub fn unmark_checked_in(&self, event_id: Snowflake) -> Result<Self, DomainError> {
        let checked_in = self
            .checked_in
            .checked_sub(1)
            .ok_or_else(|| DomainError::ledger(event_id, "checked-in count would go negative"))?;
        Ok(Self { checked_in, ..*self })
    }

    /// Change the capacity, never below the confirmed count
    pub fn resize(&self, capacity: Capacity) -> Result<Self, DomainError> {
        if !capacity.admits(self.confirmed) {
            return Err(DomainError::CapacityBelowConfirmed {
                capacity: capacity.limit().unwrap_or(u32::MAX),
                confirmed: self.confirmed,
            });
        }
        Ok(Self { capacity, ..*self })
    }

    /// Check `confirmed ≤ capacity` and `checked_in ≤ confirmed`
    pub fn check(&self, event_id: Snowflake) -> Result<(), DomainError> {
        if !self.capacity.admits(self.confirmed) {
            return Err(DomainError::ledger(
                event_id,
                format!(
                    "confirmed count {} exceeds capacity {}",
                    self.confirmed, self.capacity
                ),
            ));
        }
        if self.checked_in > self.confirmed {
            return Err(DomainError::ledger(
                event_id,
                format!(
                    "checked-in count {} exceeds confirmed count {}",
                    self.checked_in, self.confirmed
                ),
            ));
        }
        Ok(())
    }
}

/// Read-only view of an event's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub event_id: Snowflake,
    pub capacity: Capacity,
    pub confirmed_count: u32,
    pub waitlist_count: u32,
    pub checked_in_count: u32,
    /// Confirmed seats left, `None` when unlimited
    pub remaining: Option<u32>,
}

impl LedgerSnapshot {
    pub fn new(event_id: Snowflake, entry: LedgerEntry) -> Self {
        Self {
            event_id,
            capacity: entry.capacity,
            confirmed_count: entry.confirmed,
            waitlist_count: entry.waitlisted,
            checked_in_count: entry.checked_in,
            remaining: entry.capacity.remaining(entry.confirmed),
        }
    }
}

/// Result of comparing the cached counters with a full scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerVerification {
    pub event_id: Snowflake,
    /// `None` when the entry has not been loaded since startup
    pub cached: Option<LedgerEntry>,
    pub recomputed: LedgerEntry,
    pub consistent: bool,
}

// ============================================================================
// Guard
// ============================================================================

type Slot = Arc<Mutex<Option<LedgerEntry>>>;

/// Exclusive access to one event's counters
///
/// Holding the guard serializes every mutation of the event. Dropping it
/// without `commit` discards staged values.
pub struct LedgerGuard {
    event_id: Snowflake,
    slot: OwnedMutexGuard<Option<LedgerEntry>>,
    entry: LedgerEntry,
}

impl LedgerGuard {
    pub fn event_id(&self) -> Snowflake {
        self.event_id
    }

    /// Counters as of the last commit
    pub fn entry(&self) -> LedgerEntry {
        self.entry
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.event_id, self.entry)
    }

    pub fn has_room(&self) -> bool {
        self.entry.capacity.has_room(self.entry.confirmed)
    }

    /// Decide admission for one more registrant
    pub fn reserve(&self) -> (Admission, LedgerEntry) {
        self.entry.reserve()
    }

    pub fn release(&self, prior: RegistrationStatus) -> ServiceResult<LedgerEntry> {
        self.entry
            .release(self.event_id, prior)
            .map_err(|e| self.report(e, "release"))
    }

    pub fn promote(&self) -> ServiceResult<LedgerEntry> {
        self.entry
            .promote(self.event_id)
            .map_err(|e| self.report(e, "promote"))
    }

    pub fn mark_checked_in(&self) -> ServiceResult<LedgerEntry> {
        self.entry
            .mark_checked_in(self.event_id)
            .map_err(|e| self.report(e, "mark_checked_in"))
    }

    pub fn unmark_checked_in(&self) -> ServiceResult<LedgerEntry> {
        self.entry
            .unmark_checked_in(self.event_id)
            .map_err(|e| self.report(e, "unmark_checked_in"))
    }

    pub fn resize(&self, capacity: Capacity) -> ServiceResult<LedgerEntry> {
        Ok(self.entry.resize(capacity)?)
    }

    /// Publish staged counters once the matching rows are persisted
    pub fn commit(&mut self, next: LedgerEntry) {
        self.entry = next;
        *self.slot = Some(next);
    }

    fn report(&self, err: DomainError, operation: &'static str) -> super::error::ServiceError {
        if err.is_ledger_violation() {
            error!(
                event_id = %self.event_id,
                operation,
                capacity = %self.entry.capacity,
                confirmed = self.entry.confirmed,
                waitlisted = self.entry.waitlisted,
                checked_in = self.entry.checked_in,
                error = %err,
                "Ledger invariant violation; run a rebuild for this event"
            );
        }
        err.into()
    }
}

impl std::fmt::Debug for LedgerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerGuard")
            .field("event_id", &self.event_id)
            .field("entry", &self.entry)
            .finish()
    }
}

// ============================================================================
// Ledger
// ============================================================================

/// Per-event counters with per-event mutual exclusion
///
/// Events never share a lock, so work on different events runs in parallel.
pub struct CapacityLedger {
    slots: DashMap<Snowflake, Slot>,
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    check_ins: Arc<dyn CheckInRepository>,
}

impl CapacityLedger {
    pub fn new(
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        check_ins: Arc<dyn CheckInRepository>,
    ) -> Self {
        Self {
            slots: DashMap::new(),
            events,
            registrations,
            check_ins,
        }
    }

    async fn lock_slot(&self, event_id: Snowflake) -> OwnedMutexGuard<Option<LedgerEntry>> {
        // Clone the Arc out so no map shard stays locked across the await
        let slot = self.slots.entry(event_id).or_default().clone();
        slot.lock_owned().await
    }

    /// Lock an event's slot and read the event under it
    ///
    /// A slot created for an id that turns out not to resolve is dropped
    /// again, so lookups of unknown ids leave the map as it was.
    async fn lock_event(
        &self,
        event_id: Snowflake,
    ) -> ServiceResult<(OwnedMutexGuard<Option<LedgerEntry>>, Event)> {
        let slot = self.lock_slot(event_id).await;
        let err = match self.events.find_by_id(event_id).await {
            Ok(Some(event)) => return Ok((slot, event)),
            Ok(None) => DomainError::EventNotFound(event_id),
            Err(e) => e,
        };

        let unloaded = slot.is_none();
        drop(slot);
        if unloaded {
            self.evict(event_id);
        }
        Err(err.into())
    }

    /// Remove a slot nobody else holds and that never loaded counters
    fn evict(&self, event_id: Snowflake) {
        self.slots.remove_if(&event_id, |_, slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|entry| entry.is_none())
        });
    }

    /// Number of events with a lock slot
    pub fn loaded_events(&self) -> usize {
        self.slots.len()
    }

    /// Lock an event and load its counters
    ///
    /// The event is read after the lock is taken, so its status cannot
    /// change until the guard is dropped.
    #[instrument(skip(self))]
    pub async fn open(&self, event_id: Snowflake) -> ServiceResult<(LedgerGuard, Event)> {
        let (mut slot, event) = self.lock_event(event_id).await?;

        let entry = match *slot {
            Some(entry) => entry,
            None => {
                let entry = self.scan(&event).await?;
                debug!(event_id = %event_id, ?entry, "Ledger entry loaded");
                *slot = Some(entry);
                entry
            }
        };

        Ok((
            LedgerGuard {
                event_id,
                slot,
                entry,
            },
            event,
        ))
    }

    /// Promote the oldest waitlisted registration if a seat is free
    ///
    /// FIFO by creation time, ties broken by id.
    #[instrument(skip(self, guard), fields(event_id = %guard.event_id()))]
    pub async fn promote_one(
        &self,
        guard: &mut LedgerGuard,
        now: DateTime<Utc>,
    ) -> ServiceResult<Option<Registration>> {
        if !guard.has_room() || guard.entry().waitlisted == 0 {
            return Ok(None);
        }

        let Some(mut next_up) = self.registrations.oldest_waitlisted(guard.event_id()).await? else {
            warn!(
                event_id = %guard.event_id(),
                waitlisted = guard.entry().waitlisted,
                "Waitlist counter is non-zero but no waitlisted registration was found"
            );
            return Ok(None);
        };

        let staged = guard.promote()?;
        next_up.promote(now)?;
        self.registrations.update(&next_up).await?;
        guard.commit(staged);

        info!(
            event_id = %guard.event_id(),
            registration_id = %next_up.id,
            confirmed = staged.confirmed,
            waitlisted = staged.waitlisted,
            "Waitlisted registration promoted"
        );
        Ok(Some(next_up))
    }

    /// Promote waitlisted registrations until capacity or the waitlist runs out
    pub async fn fill_from_waitlist(
        &self,
        guard: &mut LedgerGuard,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<Registration>> {
        let mut promoted = Vec::new();
        while let Some(registration) = self.promote_one(guard, now).await? {
            promoted.push(registration);
        }
        Ok(promoted)
    }

    /// Current counters, after any in-flight mutation of the event completes
    #[instrument(skip(self))]
    pub async fn snapshot(&self, event_id: Snowflake) -> ServiceResult<LedgerSnapshot> {
        let (guard, _) = self.open(event_id).await?;
        Ok(guard.snapshot())
    }

    /// Recompute the counters from storage and replace the cached entry
    #[instrument(skip(self))]
    pub async fn rebuild(&self, event_id: Snowflake) -> ServiceResult<LedgerSnapshot> {
        let (mut slot, event) = self.lock_event(event_id).await?;
        let recomputed = self.scan(&event).await?;

        match *slot {
            Some(cached) if cached != recomputed => warn!(
                event_id = %event_id,
                ?cached,
                ?recomputed,
                "Ledger rebuild corrected cached counters"
            ),
            _ => {}
        }
        *slot = Some(recomputed);

        info!(
            event_id = %event_id,
            confirmed = recomputed.confirmed,
            waitlisted = recomputed.waitlisted,
            checked_in = recomputed.checked_in,
            "Ledger rebuilt"
        );
        Ok(LedgerSnapshot::new(event_id, recomputed))
    }

    /// Compare the cached counters with a full scan without changing them
    #[instrument(skip(self))]
    pub async fn verify(&self, event_id: Snowflake) -> ServiceResult<LedgerVerification> {
        let (slot, event) = self.lock_event(event_id).await?;
        let recomputed = self.scan(&event).await?;
        let cached = *slot;

        let consistent =
            cached.map_or(true, |c| c == recomputed) && recomputed.check(event_id).is_ok();
        if !consistent {
            warn!(
                event_id = %event_id,
                ?cached,
                ?recomputed,
                "Ledger verification found a mismatch"
            );
        }

        Ok(LedgerVerification {
            event_id,
            cached,
            recomputed,
            consistent,
        })
    }

    /// Count registrations and current check-ins of an event from storage
    async fn scan(&self, event: &Event) -> ServiceResult<LedgerEntry> {
        let registrations = self.registrations.find_by_event(event.id).await?;
        let current = self.check_ins.find_current_by_event(event.id).await?;

        let mut entry = LedgerEntry::empty(event.capacity);
        let mut registered = HashSet::new();
        for registration in &registrations {
            match registration.status {
                RegistrationStatus::Registered => {
                    entry.confirmed += 1;
                    registered.insert(registration.id);
                }
                RegistrationStatus::Waitlist => entry.waitlisted += 1,
                RegistrationStatus::Canceled => {}
            }
        }
        entry.checked_in = current
            .iter()
            .filter(|record| registered.contains(&record.registration_id))
            .count() as u32;

        Ok(entry)
    }
}

impl std::fmt::Debug for CapacityLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityLedger")
            .field("loaded_events", &self.loaded_events())
            .finish()
    }
}
