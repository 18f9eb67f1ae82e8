//! Domain entities - core business objects

mod check_in;
mod event;
mod registration;

pub use check_in::{is_checked_in, CheckInAction, CheckInRecord};
pub use event::{Event, EventFields, EventPatch, EventStatus};
pub use registration::{Registrant, Registration, RegistrationSource, RegistrationStatus};
