//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use temple_core::error::DomainError;
use temple_core::value_objects::Snowflake;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create an "event not found" error
pub fn event_not_found(id: Snowflake) -> DomainError {
    DomainError::EventNotFound(id)
}

/// Create a "registration not found" error
pub fn registration_not_found(id: Snowflake) -> DomainError {
    DomainError::RegistrationNotFound(id)
}

/// Convert a row count to the unsigned total used by pages
pub fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// `LIMIT`/`OFFSET` values bind as BIGINT
pub fn to_bind(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Build the `ILIKE` pattern for a keyword, `None` when blank
pub fn like_pattern(keyword: Option<&str>) -> Option<String> {
    keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| {
            let escaped = k
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}
