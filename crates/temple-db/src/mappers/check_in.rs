//! Check-in record entity <-> model mapper

use temple_core::entities::CheckInRecord;
use temple_core::error::DomainError;
use temple_core::value_objects::{Actor, Snowflake};

use crate::models::CheckInRecordModel;

impl TryFrom<CheckInRecordModel> for CheckInRecord {
    type Error = DomainError;

    fn try_from(model: CheckInRecordModel) -> Result<Self, Self::Error> {
        Ok(CheckInRecord {
            id: Snowflake::new(model.id),
            registration_id: Snowflake::new(model.registration_id),
            event_id: Snowflake::new(model.event_id),
            action: model.action.parse()?,
            actor: Actor::new(model.actor),
            is_current: model.is_current,
            recorded_at: model.recorded_at,
        })
    }
}
