//! Business logic services
//!
//! The engine: event lifecycle, capacity ledger, registrations, check-in
//! and the read-only listing views.

pub mod check_in;
pub mod context;
pub mod error;
pub mod event;
pub mod ledger;
pub mod notify;
pub mod query;
pub mod registration;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all services for convenience
pub use check_in::CheckInService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use event::{CapacityChange, EventService};
pub use ledger::{
    Admission, CapacityLedger, LedgerEntry, LedgerGuard, LedgerSnapshot, LedgerVerification,
};
pub use notify::TracingNotifier;
pub use query::{EventSummary, QueryService};
pub use registration::{RegistrationChange, RegistrationService};
