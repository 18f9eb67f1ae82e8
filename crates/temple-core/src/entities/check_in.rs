//! Check-in record - append-only attendance history for a registration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{Actor, Snowflake};

/// What a record did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckInAction {
    CheckedIn,
    Undone,
}

impl CheckInAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckedIn => "checked-in",
            Self::Undone => "undone",
        }
    }
}

impl fmt::Display for CheckInAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checked-in" => Ok(Self::CheckedIn),
            "undone" => Ok(Self::Undone),
            other => Err(DomainError::ValidationError(format!(
                "unknown check-in action '{other}'"
            ))),
        }
    }
}

/// One entry in a registration's check-in history
///
/// Records are never deleted. Undo flips the prior record's `is_current`
/// and appends an `Undone` record, which is itself never current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub id: Snowflake,
    pub registration_id: Snowflake,
    pub event_id: Snowflake,
    pub action: CheckInAction,
    pub actor: Actor,
    pub is_current: bool,
    pub recorded_at: DateTime<Utc>,
}

impl CheckInRecord {
    /// New current check-in
    pub fn checked_in(
        id: Snowflake,
        registration_id: Snowflake,
        event_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            registration_id,
            event_id,
            action: CheckInAction::CheckedIn,
            actor,
            is_current: true,
            recorded_at: now,
        }
    }

    /// Undo marker appended after superseding the current record
    pub fn undone(
        id: Snowflake,
        registration_id: Snowflake,
        event_id: Snowflake,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            registration_id,
            event_id,
            action: CheckInAction::Undone,
            actor,
            is_current: false,
            recorded_at: now,
        }
    }
}

/// Derive attendance from history ordered oldest first
pub fn is_checked_in(history: &[CheckInRecord]) -> bool {
    history
        .last()
        .is_some_and(|r| r.action == CheckInAction::CheckedIn)
}
