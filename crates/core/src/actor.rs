use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Actor recorded on audit entries when the caller does not identify itself.
pub const SYSTEM_ACTOR: &str = "system";

/// The caller responsible for a write, recorded as `user_email` in audit entries.
///
/// The service runs without authentication, so the actor is advisory: it is
/// taken from the payload when present and falls back to [`SYSTEM_ACTOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor(String);

impl Actor {
    /// Creates an actor from an optional caller-supplied email.
    #[must_use]
    pub fn from_optional(email: Option<&str>) -> Self {
        match email.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Self(value.to_owned()),
            None => Self::system(),
        }
    }

    /// Returns the built-in system actor.
    #[must_use]
    pub fn system() -> Self {
        Self(SYSTEM_ACTOR.to_owned())
    }

    /// Returns the actor as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}

impl Display for Actor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
