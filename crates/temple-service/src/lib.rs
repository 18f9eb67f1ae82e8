//! # temple-service
//!
//! Application layer: the registration, capacity and check-in engine,
//! its dependency container, and the DTOs the HTTP boundary speaks.

pub mod dto;
pub mod services;

pub use services::{
    CapacityChange, CapacityLedger, CheckInService, EventService, EventSummary, LedgerSnapshot,
    LedgerVerification, QueryService, RegistrationChange, RegistrationService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};
