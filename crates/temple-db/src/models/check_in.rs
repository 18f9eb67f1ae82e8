//! Check-in record database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for check_in_records table
#[derive(Debug, Clone, FromRow)]
pub struct CheckInRecordModel {
    pub id: i64,
    pub registration_id: i64,
    pub event_id: i64,
    pub action: String,
    pub actor: String,
    pub is_current: bool,
    pub recorded_at: DateTime<Utc>,
}
