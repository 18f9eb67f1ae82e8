//! Capacity - the number of confirmed seats an event offers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Event capacity, either a finite seat count (at least 1) or unlimited
///
/// Serialized as a nullable integer: `null` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Option<i64>", into = "Option<i64>")]
pub enum Capacity {
    Limited(u32),
    Unlimited,
}

impl Capacity {
    /// Create a finite capacity
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCapacity` when `seats < 1` or does not fit in a u32
    pub fn limited(seats: i64) -> Result<Self, DomainError> {
        if seats < 1 {
            return Err(DomainError::InvalidCapacity(seats));
        }
        u32::try_from(seats)
            .map(Self::Limited)
            .map_err(|_| DomainError::InvalidCapacity(seats))
    }

    /// Seat limit, `None` when unlimited
    pub fn limit(&self) -> Option<u32> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Check whether one more confirmed registrant fits
    pub fn has_room(&self, confirmed: u32) -> bool {
        match self {
            Self::Limited(n) => confirmed < *n,
            Self::Unlimited => true,
        }
    }

    /// Remaining confirmed seats, `None` when unlimited
    pub fn remaining(&self, confirmed: u32) -> Option<u32> {
        self.limit().map(|n| n.saturating_sub(confirmed))
    }

    /// Check whether `confirmed` registrants fit without exceeding the limit
    pub fn admits(&self, confirmed: u32) -> bool {
        self.limit().map_or(true, |n| confirmed <= n)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

impl TryFrom<Option<i64>> for Capacity {
    type Error = DomainError;

    fn try_from(value: Option<i64>) -> Result<Self, Self::Error> {
        match value {
            Some(seats) => Self::limited(seats),
            None => Ok(Self::Unlimited),
        }
    }
}

impl From<Capacity> for Option<i64> {
    fn from(capacity: Capacity) -> Self {
        capacity.limit().map(i64::from)
    }
}
