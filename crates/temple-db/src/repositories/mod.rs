//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in temple-core.
//! Each repository handles database operations for a specific domain entity.

mod check_in;
mod error;
mod event;
mod health;
mod registration;

pub use check_in::PgCheckInRepository;
pub use event::PgEventRepository;
pub use health::PgHealthProbe;
pub use registration::PgRegistrationRepository;
