//! Registration entity - one registrant's claim against an event's capacity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Registration status
///
/// `canceled` is terminal. The only backwards edge is `waitlist → registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Waitlist,
    Canceled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Waitlist => "waitlist",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Canceled)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "waitlist" => Ok(Self::Waitlist),
            "canceled" => Ok(Self::Canceled),
            other => Err(DomainError::ValidationError(format!(
                "unknown registration status '{other}'"
            ))),
        }
    }
}

/// How the registration entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationSource {
    SelfService,
    StaffManual,
}

impl RegistrationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfService => "self-service",
            Self::StaffManual => "staff-manual",
        }
    }
}

impl fmt::Display for RegistrationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self-service" => Ok(Self::SelfService),
            "staff-manual" => Ok(Self::StaffManual),
            other => Err(DomainError::ValidationError(format!(
                "unknown registration source '{other}'"
            ))),
        }
    }
}

/// Contact details of the person registering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Registrant {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 20, message = "phone must be 1-20 characters"))]
    pub phone: String,

    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,

    #[validate(length(max = 1000, message = "note must be at most 1000 characters"))]
    pub note: Option<String>,
}

/// Registration entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: Snowflake,
    pub event_id: Snowflake,
    /// Linked public account, if the registrant was signed in
    pub user_id: Option<String>,
    pub registrant: Registrant,
    pub source: RegistrationSource,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Create a registration in the status the ledger admitted it with
    pub fn new(
        id: Snowflake,
        event_id: Snowflake,
        user_id: Option<String>,
        registrant: Registrant,
        source: RegistrationSource,
        status: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            user_id,
            registrant,
            source,
            status,
            created_at: now,
            updated_at: now,
            canceled_at: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }

    pub fn is_waitlisted(&self) -> bool {
        self.status == RegistrationStatus::Waitlist
    }

    pub fn is_canceled(&self) -> bool {
        self.status == RegistrationStatus::Canceled
    }

    /// Mark canceled and return the status being vacated
    ///
    /// # Errors
    /// Returns `DomainError::AlreadyCanceled` if the registration is already canceled
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<RegistrationStatus, DomainError> {
        if self.is_canceled() {
            return Err(DomainError::AlreadyCanceled(self.id));
        }
        let prior = self.status;
        self.status = RegistrationStatus::Canceled;
        self.canceled_at = Some(now);
        self.updated_at = now;
        Ok(prior)
    }

    /// Move a waitlisted registration to registered
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStatusChange` unless the registration is waitlisted
    pub fn promote(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_waitlisted() {
            return Err(DomainError::InvalidStatusChange {
                from: self.status,
                to: RegistrationStatus::Registered,
            });
        }
        self.status = RegistrationStatus::Registered;
        self.updated_at = now;
        Ok(())
    }

    /// FIFO position on the waitlist: creation time, then id
    pub fn queue_key(&self) -> (DateTime<Utc>, Snowflake) {
        (self.created_at, self.id)
    }
}
