//! HTTP handlers
//!
//! Request handlers for all API endpoints.

pub mod check_ins;
pub mod events;
pub mod health;
pub mod ledger;
pub mod registrations;
