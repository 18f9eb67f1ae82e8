//! Axum extractors for request handling
//!
//! Custom extractors for the actor header, validation, and path ids.

mod actor;
mod path;
mod validated;

pub use actor::{RequestActor, StaffActor, XActorId, X_ACTOR_ID};
pub use path::SnowflakePath;
pub use validated::{ValidatedJson, ValidatedQuery};
