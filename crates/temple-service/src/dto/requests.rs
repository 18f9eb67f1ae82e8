//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use temple_core::{
    Capacity, DomainError, EventFields, EventPatch, EventStatus, Registrant, RegistrationStatus,
    Snowflake,
};

/// Keep "absent" and "null" apart: absent is `None`, null is `Some(None)`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An empty cover reference clears the cover
fn normalize_cover(cover: Option<String>) -> Option<String> {
    cover.filter(|c| !c.trim().is_empty())
}

// ============================================================================
// Event Requests
// ============================================================================

/// Create event request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    pub organization_id: Snowflake,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,

    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub registration_closes_at: DateTime<Utc>,

    /// Seat count, null or absent for unlimited
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i64>,

    /// Fee in minor currency units
    #[serde(default)]
    #[validate(range(min = 0, message = "Fee cannot be negative"))]
    pub fee_cents: i64,

    #[validate(length(max = 500, message = "Cover asset must be at most 500 characters"))]
    pub cover_asset: Option<String>,
}

impl CreateEventRequest {
    /// Convert into domain fields
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCapacity` for a non-positive capacity
    pub fn into_fields(self) -> Result<(Snowflake, EventFields), DomainError> {
        let fields = EventFields {
            title: self.title,
            description: self.description,
            location: self.location,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            registration_closes_at: self.registration_closes_at,
            capacity: Capacity::try_from(self.capacity)?,
            fee_cents: self.fee_cents,
            cover_asset: normalize_cover(self.cover_asset),
        };
        Ok((self.organization_id, fields))
    }
}

/// Update event request
///
/// Absent fields are left unchanged. For `capacity` null means unlimited,
/// for `cover_asset` null or "" removes the cover.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<i64>>,

    #[validate(range(min = 0, message = "Fee cannot be negative"))]
    pub fee_cents: Option<i64>,

    #[serde(default, deserialize_with = "double_option")]
    pub cover_asset: Option<Option<String>>,
}

impl UpdateEventRequest {
    /// Convert into a domain patch
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCapacity` for a non-positive capacity
    pub fn into_patch(self) -> Result<EventPatch, DomainError> {
        Ok(EventPatch {
            title: self.title,
            description: self.description,
            location: self.location,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            registration_closes_at: self.registration_closes_at,
            capacity: self.capacity.map(Capacity::try_from).transpose()?,
            fee_cents: self.fee_cents,
            cover_asset: self.cover_asset.map(normalize_cover),
        })
    }
}

/// Resize capacity request
///
/// `capacity` must be present; null means unlimited.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResizeCapacityRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<i64>>,
}

impl ResizeCapacityRequest {
    pub fn into_capacity(self) -> Result<Capacity, DomainError> {
        let seats = self
            .capacity
            .ok_or_else(|| DomainError::ValidationError("capacity is required".to_string()))?;
        Capacity::try_from(seats)
    }
}

// ============================================================================
// Registration Requests
// ============================================================================

/// Self-service registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitRegistrationRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub registrant: Registrant,

    /// Public account of a signed-in registrant
    #[validate(length(min = 1, max = 100, message = "User id must be 1-100 characters"))]
    pub user_id: Option<String>,
}

/// Staff-entered registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualRegistrationRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub registrant: Registrant,
}

/// Staff status override request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetRegistrationStatusRequest {
    pub status: RegistrationStatus,
}

// ============================================================================
// Listing Queries
// ============================================================================

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, message = "Page size must be at least 1"))]
    pub page_size: Option<u32>,
}

/// Event listing query
///
/// Query strings carry every value as text, so the page fields sit inline
/// rather than in a flattened struct.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListEventsQuery {
    pub organization_id: Option<Snowflake>,
    pub status: Option<EventStatus>,

    #[validate(length(max = 100, message = "Keyword must be at most 100 characters"))]
    pub keyword: Option<String>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, message = "Page size must be at least 1"))]
    pub page_size: Option<u32>,
}

/// Registration listing query for one event
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListRegistrationsQuery {
    pub status: Option<RegistrationStatus>,

    #[validate(length(max = 100, message = "Keyword must be at most 100 characters"))]
    pub keyword: Option<String>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, message = "Page size must be at least 1"))]
    pub page_size: Option<u32>,
}

impl ListEventsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl ListRegistrationsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}
