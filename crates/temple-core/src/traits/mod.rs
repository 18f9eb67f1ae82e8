//! Ports implemented by the infrastructure layer

mod notifier;
mod repositories;

pub use notifier::Notifier;
pub use repositories::{
    CheckInRepository, EventFilter, EventRepository, HealthProbe, Page, PageRequest,
    RegistrationFilter, RegistrationRepository, RepoResult, StatusCounts,
};
