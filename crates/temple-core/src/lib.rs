//! # temple-core
//!
//! Domain layer containing the event, registration and check-in entities,
//! value objects, repository traits, and domain events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    is_checked_in, CheckInAction, CheckInRecord, Event, EventFields, EventPatch, EventStatus,
    Registrant, Registration, RegistrationSource, RegistrationStatus,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    CheckInRepository, EventFilter, EventRepository, HealthProbe, Notifier, Page, PageRequest,
    RegistrationFilter, RegistrationRepository, RepoResult, StatusCounts,
};
pub use value_objects::{Actor, Capacity, Snowflake, SnowflakeGenerator, SnowflakeParseError};
