//! Integration test utilities for the temple server
//!
//! Spawns the REST API in-process on the memory backend and drives it
//! over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
