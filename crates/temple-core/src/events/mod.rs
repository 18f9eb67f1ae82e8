//! Domain events emitted on state changes

mod domain_event;

pub use domain_event::{
    CheckInEvent, DomainEvent, EventStatusChangedEvent, RegistrationCanceledEvent,
    RegistrationCreatedEvent, RegistrationPromotedEvent,
};
