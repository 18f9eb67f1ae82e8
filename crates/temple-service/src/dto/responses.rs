//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use temple_core::{CheckInAction, EventStatus, RegistrationSource, RegistrationStatus};

use crate::services::LedgerSnapshot;

// ============================================================================
// Common Response Types
// ============================================================================

/// Page-numbered list response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    /// Rows across all pages
    pub total: u64,
    pub total_pages: u64,
}

// ============================================================================
// Event Responses
// ============================================================================

/// Event response
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub registration_closes_at: DateTime<Utc>,
    /// Seat count, null when unlimited
    pub capacity: Option<u32>,
    pub fee_cents: i64,
    pub cover_asset: Option<String>,
    pub status: EventStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row in a listing
#[derive(Debug, Clone, Serialize)]
pub struct EventSummaryResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub confirmed_count: u64,
}

/// Result of a capacity change
#[derive(Debug, Clone, Serialize)]
pub struct CapacityChangeResponse {
    pub event: EventResponse,
    pub ledger: LedgerSnapshot,
    /// Waitlisted registrations moved into the new room, oldest first
    pub promoted: Vec<RegistrationResponse>,
}

// ============================================================================
// Registration Responses
// ============================================================================

/// Registration response
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub note: Option<String>,
    pub source: RegistrationSource,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

/// Result of a cancellation or status override
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationChangeResponse {
    pub registration: RegistrationResponse,
    /// Registration promoted from the waitlist into the freed seat
    pub promoted: Option<RegistrationResponse>,
}

// ============================================================================
// Check-in Responses
// ============================================================================

/// Check-in audit record
#[derive(Debug, Clone, Serialize)]
pub struct CheckInRecordResponse {
    pub id: String,
    pub registration_id: String,
    pub event_id: String,
    pub action: CheckInAction,
    pub actor: String,
    pub is_current: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Attendance state of one registration
#[derive(Debug, Clone, Serialize)]
pub struct CheckInStatusResponse {
    pub registration_id: String,
    pub checked_in: bool,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy(now: DateTime<Utc>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now,
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub storage: String,
}

impl ReadinessResponse {
    pub fn ready(storage_healthy: bool, now: DateTime<Utc>) -> Self {
        Self {
            status: if storage_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: now,
            checks: HealthChecks {
                storage: if storage_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
