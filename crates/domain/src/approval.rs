use std::str::FromStr;

use chrono::{DateTime, Utc};
use gerbil_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::calendar::normalize_optional_text;

/// Release decision recorded by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Release may proceed.
    Approved,
    /// Release is blocked.
    Rejected,
}

impl ApprovalDecision {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalDecision {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" | "approve" => Ok(Self::Approved),
            "rejected" | "reject" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "status must be either approved or rejected, got '{value}'"
            ))),
        }
    }
}

/// A recorded release decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    /// Storage identifier.
    pub id: Uuid,
    /// Project storage identifier.
    pub project_id: Uuid,
    /// Version the decision applies to.
    pub release_version: Option<String>,
    /// Decision.
    pub status: ApprovalDecision,
    /// Mandatory justification.
    pub comment: NonEmptyString,
    /// Who decided.
    pub approver_name: Option<String>,
    /// Gate evaluation the decision was based on.
    pub gate_snapshot: Option<Value>,
    /// Decision time.
    pub created_at: DateTime<Utc>,
}

/// Input payload for recording a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalInput {
    /// Project storage identifier.
    pub project_id: Uuid,
    /// Version the decision applies to.
    pub release_version: Option<String>,
    /// Decision.
    pub status: ApprovalDecision,
    /// Justification, required.
    pub comment: Option<String>,
    /// Who decided.
    pub approver_name: Option<String>,
    /// Gate evaluation the decision was based on.
    pub gate_snapshot: Option<Value>,
}

impl Approval {
    /// Creates a validated approval. Both decisions require a comment.
    pub fn new(input: ApprovalInput, now: DateTime<Utc>) -> AppResult<Self> {
        let comment = input
            .comment
            .filter(|comment| !comment.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "comment is required when a release is {}",
                    input.status.as_str()
                ))
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            release_version: normalize_optional_text("release_version", input.release_version, 50)?,
            status: input.status,
            comment: NonEmptyString::bounded(comment, "comment", 2_000)?,
            approver_name: normalize_optional_text("approver_name", input.approver_name, 100)?,
            gate_snapshot: input.gate_snapshot,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use uuid::Uuid;

    use super::{Approval, ApprovalDecision, ApprovalInput};

    fn input(comment: Option<&str>) -> ApprovalInput {
        ApprovalInput {
            project_id: Uuid::new_v4(),
            release_version: Some("1.4.0".to_owned()),
            status: ApprovalDecision::Rejected,
            comment: comment.map(ToOwned::to_owned),
            approver_name: None,
            gate_snapshot: None,
        }
    }

    #[test]
    fn comment_is_mandatory() {
        assert!(Approval::new(input(None), Utc::now()).is_err());
        assert!(Approval::new(input(Some("   ")), Utc::now()).is_err());
        assert!(Approval::new(input(Some("critical defect open")), Utc::now()).is_ok());
    }

    #[test]
    fn decision_parses_case_insensitively() {
        assert_eq!(
            ApprovalDecision::from_str("APPROVED").ok(),
            Some(ApprovalDecision::Approved)
        );
        assert!(ApprovalDecision::from_str("pending").is_err());
    }
}
