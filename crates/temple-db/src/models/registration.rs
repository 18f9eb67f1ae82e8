//! Registration database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for registrations table
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationModel {
    pub id: i64,
    pub event_id: i64,
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub note: Option<String>,
    pub source: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl RegistrationModel {
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }
}

/// Registrations of one event grouped by status
#[derive(Debug, Clone, FromRow)]
pub struct StatusCountModel {
    pub status: String,
    pub count: i64,
}
