//! Shared primitives for all Rust crates in Gerbil.

#![forbid(unsafe_code)]

/// Caller identity recorded on audited writes.
pub mod actor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use actor::{Actor, SYSTEM_ACTOR};

/// Result type used across Gerbil crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a trimmed non-empty string no longer than `max_chars`.
    ///
    /// `field` names the offending input in validation messages.
    pub fn bounded(value: impl Into<String>, field: &str, max_chars: usize) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }

        let length = trimmed.chars().count();
        if length > max_chars {
            return Err(AppError::Validation(format!(
                "{field} must be at most {max_chars} characters, got {length}"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested status change is not allowed by the task state machine.
    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller presented missing or wrong credentials on an internal route.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the message without the category prefix.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::InvalidTransition(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Actor, AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn bounded_string_trims_and_enforces_length() {
        let value = NonEmptyString::bounded("  Apollo  ", "name", 10)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(value.as_str(), "Apollo");

        let too_long = NonEmptyString::bounded("x".repeat(11), "name", 10);
        assert!(matches!(too_long, Err(AppError::Validation(message)) if message.contains("name")));
    }

    #[test]
    fn actor_falls_back_to_system() {
        assert_eq!(Actor::from_optional(None).as_str(), "system");
        assert_eq!(Actor::from_optional(Some("  ")).as_str(), "system");
        assert_eq!(
            Actor::from_optional(Some("qa@gerbil.qc")).as_str(),
            "qa@gerbil.qc"
        );
    }

    #[test]
    fn detail_strips_category() {
        let error = AppError::NotFound("project 'x' does not exist".to_owned());
        assert_eq!(error.detail(), "project 'x' does not exist");
        assert_eq!(error.to_string(), "not found: project 'x' does not exist");
    }
}
