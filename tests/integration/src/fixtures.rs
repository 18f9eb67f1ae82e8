//! Test fixtures and data generators
//!
//! Provides reusable request bodies and typed views of API responses.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Create event request
#[derive(Debug, Clone, Serialize)]
pub struct CreateEventRequest {
    pub organization_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub registration_closes_at: DateTime<Utc>,
    pub capacity: Option<i64>,
    pub fee_cents: i64,
}

impl CreateEventRequest {
    /// Event a week out whose registration window is open now
    pub fn upcoming(capacity: Option<i64>) -> Self {
        let starts_at = Utc::now() + Duration::days(7);
        Self {
            organization_id: "1".to_string(),
            title: format!("Full Moon Prayer {}", unique_suffix()),
            description: "Monthly prayer gathering".to_string(),
            location: "Main Hall".to_string(),
            starts_at,
            ends_at: starts_at + Duration::hours(2),
            registration_closes_at: starts_at - Duration::days(1),
            capacity,
            fee_cents: 0,
        }
    }
}

/// Registration request body
#[derive(Debug, Clone, Serialize)]
pub struct RegistrantRequest {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RegistrantRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            name: format!("Devotee {suffix}"),
            phone: format!("09{suffix:08}"),
            email: Some(format!("devotee{suffix}@example.com")),
        }
    }
}

/// Event response
#[derive(Debug, Clone, Deserialize)]
pub struct EventBody {
    pub id: String,
    pub title: String,
    pub capacity: Option<u32>,
    pub status: String,
    pub created_by: String,
}

/// Registration response
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationBody {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub source: String,
    pub status: String,
}

/// Cancellation or status override response
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationChangeBody {
    pub registration: RegistrationBody,
    pub promoted: Option<RegistrationBody>,
}

/// Ledger counters
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerBody {
    pub capacity: Option<u32>,
    pub confirmed_count: u32,
    pub waitlist_count: u32,
    pub checked_in_count: u32,
    pub remaining: Option<u32>,
}

/// Check-in audit record
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInBody {
    pub action: String,
    pub actor: String,
    pub is_current: bool,
}

/// Page of rows
#[derive(Debug, Clone, Deserialize)]
pub struct PageBody<T> {
    pub data: Vec<T>,
    pub pagination: PaginationBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationBody {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}
