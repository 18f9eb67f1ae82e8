//! Domain errors - error types for the domain layer
//!
//! Every variant belongs to one of four families: not found, validation,
//! state (a lifecycle or status guard refused the operation), and ledger
//! invariant violations. Infrastructure failures are wrapped as strings.

use thiserror::Error;

use crate::entities::{EventStatus, RegistrationStatus};
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Event not found: {0}")]
    EventNotFound(Snowflake),

    #[error("Registration not found: {0}")]
    RegistrationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Capacity must be at least 1, got {0}")]
    InvalidCapacity(i64),

    #[error("Fee cannot be negative, got {0}")]
    NegativeFee(i64),

    #[error("Capacity {capacity} is below the {confirmed} confirmed registrations")]
    CapacityBelowConfirmed { capacity: u32, confirmed: u32 },

    // =========================================================================
    // State Errors
    // =========================================================================
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    #[error("Event {event_id} is not accepting registrations: {reason}")]
    EventNotAcceptingRegistrations {
        event_id: Snowflake,
        reason: &'static str,
    },

    #[error("Event {event_id} cannot be edited while {status}")]
    EventNotEditable {
        event_id: Snowflake,
        status: EventStatus,
    },

    #[error("Event {event_id} does not allow check-in while {status}")]
    CheckInNotAllowed {
        event_id: Snowflake,
        status: EventStatus,
    },

    #[error("Event {0} has no remaining capacity")]
    EventFull(Snowflake),

    #[error("Registration {0} is already canceled")]
    AlreadyCanceled(Snowflake),

    #[error("Registration status cannot change from {from} to {to}")]
    InvalidStatusChange {
        from: RegistrationStatus,
        to: RegistrationStatus,
    },

    #[error("Registration {registration_id} is {status} and cannot be checked in")]
    IneligibleForCheckIn {
        registration_id: Snowflake,
        status: RegistrationStatus,
    },

    #[error("Registration {0} is not checked in")]
    NotCheckedIn(Snowflake),

    // =========================================================================
    // Ledger Errors
    // =========================================================================
    #[error("Ledger invariant violated for event {event_id}: {detail}")]
    LedgerInvariantViolation { event_id: Snowflake, detail: String },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::EventNotFound(_) => "UNKNOWN_EVENT",
            Self::RegistrationNotFound(_) => "UNKNOWN_REGISTRATION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidSchedule(_) => "INVALID_SCHEDULE",
            Self::InvalidCapacity(_) => "INVALID_CAPACITY",
            Self::NegativeFee(_) => "NEGATIVE_FEE",
            Self::CapacityBelowConfirmed { .. } => "CAPACITY_BELOW_CONFIRMED",

            // State
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::EventNotAcceptingRegistrations { .. } => "EVENT_NOT_ACCEPTING_REGISTRATIONS",
            Self::EventNotEditable { .. } => "EVENT_NOT_EDITABLE",
            Self::CheckInNotAllowed { .. } => "CHECK_IN_NOT_ALLOWED",
            Self::EventFull(_) => "EVENT_FULL",
            Self::AlreadyCanceled(_) => "ALREADY_CANCELED",
            Self::InvalidStatusChange { .. } => "INVALID_STATUS_CHANGE",
            Self::IneligibleForCheckIn { .. } => "INELIGIBLE_FOR_CHECK_IN",
            Self::NotCheckedIn(_) => "NOT_CHECKED_IN",

            // Ledger
            Self::LedgerInvariantViolation { .. } => "LEDGER_INVARIANT_VIOLATION",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::NotificationError(_) => "NOTIFICATION_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound(_) | Self::RegistrationNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidSchedule(_)
                | Self::InvalidCapacity(_)
                | Self::NegativeFee(_)
                | Self::CapacityBelowConfirmed { .. }
        )
    }

    /// Check if this is a lifecycle or status guard refusal
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::EventNotAcceptingRegistrations { .. }
                | Self::EventNotEditable { .. }
                | Self::CheckInNotAllowed { .. }
                | Self::EventFull(_)
                | Self::AlreadyCanceled(_)
                | Self::InvalidStatusChange { .. }
                | Self::IneligibleForCheckIn { .. }
                | Self::NotCheckedIn(_)
        )
    }

    /// Check if this signals a ledger inconsistency
    pub fn is_ledger_violation(&self) -> bool {
        matches!(self, Self::LedgerInvariantViolation { .. })
    }

    /// Create a ledger invariant violation
    pub fn ledger(event_id: Snowflake, detail: impl Into<String>) -> Self {
        Self::LedgerInvariantViolation {
            event_id,
            detail: detail.into(),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        Self::ValidationError(messages.join("; "))
    }
}
