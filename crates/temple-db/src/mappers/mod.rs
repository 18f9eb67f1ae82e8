//! Entity to model mappers
//!
//! Conversions between domain entities (temple-core) and database models.
//! - `TryFrom<Model> for Entity`: convert database rows to domain objects,
//!   rejecting values the domain does not accept
//! - `*Row` structs and helpers: prepare entity data for database operations

mod check_in;
mod event;
mod registration;

pub use event::{capacity_to_column, status_to_str, EventRow};
pub use registration::status_counts;

use temple_core::error::DomainError;

/// Map a batch of rows, failing on the first invalid one
pub fn convert_all<M, E>(rows: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(E::try_from).collect()
}
