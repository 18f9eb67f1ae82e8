//! Registration entity <-> model mapper

use temple_core::entities::{Registrant, Registration};
use temple_core::error::DomainError;
use temple_core::traits::StatusCounts;
use temple_core::value_objects::Snowflake;

use crate::models::{RegistrationModel, StatusCountModel};

/// Convert RegistrationModel to Registration entity
impl TryFrom<RegistrationModel> for Registration {
    type Error = DomainError;

    fn try_from(model: RegistrationModel) -> Result<Self, Self::Error> {
        Ok(Registration {
            id: Snowflake::new(model.id),
            event_id: Snowflake::new(model.event_id),
            user_id: model.user_id,
            registrant: Registrant {
                name: model.name,
                phone: model.phone,
                email: model.email,
                note: model.note,
            },
            source: model.source.parse()?,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            canceled_at: model.canceled_at,
        })
    }
}

/// Fold `GROUP BY status` rows into counters
pub fn status_counts(rows: Vec<StatusCountModel>) -> Result<StatusCounts, DomainError> {
    let mut counts = StatusCounts::default();
    for row in rows {
        let n = u32::try_from(row.count)
            .map_err(|_| DomainError::DatabaseError(format!("count out of range: {}", row.count)))?;
        match row.status.parse()? {
            temple_core::RegistrationStatus::Registered => counts.registered = n,
            temple_core::RegistrationStatus::Waitlist => counts.waitlist = n,
            temple_core::RegistrationStatus::Canceled => counts.canceled = n,
        }
    }
    Ok(counts)
}
