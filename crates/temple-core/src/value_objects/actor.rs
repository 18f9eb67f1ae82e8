//! Actor - opaque identity of whoever triggered a staff or check-in operation
//!
//! Authentication happens outside the engine; the actor is recorded as given.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity recorded on check-in records and staff operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Identifier used when the engine acts on its own behalf
    pub const SYSTEM: &'static str = "system";

    /// Create an actor from an opaque id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The engine itself
    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    pub fn is_system(&self) -> bool {
        self.0 == Self::SYSTEM
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Actor {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Actor {
    fn from(id: String) -> Self {
        Self(id)
    }
}
