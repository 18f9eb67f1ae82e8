//! Value objects - immutable types that represent domain concepts

mod actor;
mod capacity;
mod snowflake;

pub use actor::Actor;
pub use capacity::Capacity;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
