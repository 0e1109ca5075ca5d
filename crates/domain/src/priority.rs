use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gerbil_core::AppError;
use serde::{Deserialize, Serialize};

/// Priority shared by projects and tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Must ship first.
    High,
    /// Default priority.
    #[default]
    Medium,
    /// Can slip.
    Low,
}

impl Priority {
    /// Returns the canonical transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(AppError::Validation(format!(
                "priority must be one of High, Medium, Low, got '{value}'"
            ))),
        }
    }
}
