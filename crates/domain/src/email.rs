use gerbil_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A structurally valid, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Checks for exactly one `@`, a non-empty local part and a dotted domain.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(format!(
                "email '{value}' must contain '@'"
            )));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(format!(
                "email '{value}' must have one '@' and a local part"
            )));
        }

        let labels_valid = domain.split('.').all(|label| !label.is_empty());
        if !domain.contains('.') || !labels_valid {
            return Err(AppError::Validation(format!(
                "email '{value}' must have a dotted domain"
            )));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::EmailAddress;

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = EmailAddress::new("  QA.Lead@Gerbil.QC ").unwrap_or_else(|_| unreachable!());
        assert_eq!(email.as_str(), "qa.lead@gerbil.qc");
    }

    #[test]
    fn rejects_structurally_invalid_addresses() {
        for value in ["", "plain", "@gerbil.qc", "a@b", "a@@b.qc", "a@b..qc"] {
            assert!(EmailAddress::new(value).is_err(), "{value} should be rejected");
        }
    }
}
