//! Database models - SQLx-compatible structs for PostgreSQL tables

mod check_in;
mod event;
mod registration;

pub use check_in::CheckInRecordModel;
pub use event::{CountModel, EventModel};
pub use registration::{RegistrationModel, StatusCountModel};
