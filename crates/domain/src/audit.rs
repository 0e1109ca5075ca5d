use std::str::FromStr;

use gerbil_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of write recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity changed.
    Update,
    /// Entity soft-deleted.
    Delete,
}

impl AuditAction {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown audit action '{value}'"
            ))),
        }
    }
}

/// Audited entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    /// Projects.
    Project,
    /// Tasks.
    Task,
    /// Resources.
    Resource,
    /// Release approvals.
    Approval,
    /// Quality gates.
    QualityGate,
    /// Test run summaries.
    TestRun,
}

impl AuditEntityType {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Resource => "resource",
            Self::Approval => "approval",
            Self::QualityGate => "quality_gate",
            Self::TestRun => "test_run",
        }
    }
}

impl FromStr for AuditEntityType {
    type Err = AppError;

    /// Accepts singular or plural names in any case, with `-` or `_` separators.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        let singular = normalized.strip_suffix('s').unwrap_or(normalized.as_str());
        match singular {
            "project" => Ok(Self::Project),
            "task" => Ok(Self::Task),
            "resource" => Ok(Self::Resource),
            "approval" => Ok(Self::Approval),
            "quality_gate" | "gate" => Ok(Self::QualityGate),
            "test_run" => Ok(Self::TestRun),
            _ => Err(AppError::Validation(format!(
                "unknown audit entity '{value}'"
            ))),
        }
    }
}

/// Top-level keys whose values differ between two JSON object snapshots, sorted.
///
/// `updated_at` is ignored. Non-object snapshots compare as a whole under `"*"`.
#[must_use]
pub fn changed_fields(before: Option<&Value>, after: Option<&Value>) -> Vec<String> {
    let empty = serde_json::Map::new();
    let (before_fields, after_fields) = match (before, after) {
        (Some(Value::Object(before)), Some(Value::Object(after))) => (before, after),
        (None, Some(Value::Object(after))) => (&empty, after),
        (Some(Value::Object(before)), None) => (before, &empty),
        (None, None) => return Vec::new(),
        (before, after) => {
            return if before == after {
                Vec::new()
            } else {
                vec!["*".to_owned()]
            };
        }
    };

    let mut keys: Vec<String> = before_fields
        .keys()
        .chain(after_fields.keys())
        .filter(|key| key.as_str() != "updated_at")
        .filter(|key| before_fields.get(key.as_str()) != after_fields.get(key.as_str()))
        .cloned()
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::{AuditEntityType, changed_fields};

    #[test]
    fn entity_names_accept_plurals() {
        assert_eq!(
            AuditEntityType::from_str("approvals").ok(),
            Some(AuditEntityType::Approval)
        );
        assert_eq!(
            AuditEntityType::from_str("Project").ok(),
            Some(AuditEntityType::Project)
        );
        assert_eq!(
            AuditEntityType::from_str("quality-gates").ok(),
            Some(AuditEntityType::QualityGate)
        );
        assert!(AuditEntityType::from_str("users").is_err());
    }

    #[test]
    fn changed_fields_ignores_timestamps() {
        let before = json!({"name": "A", "priority": "High", "updated_at": "t1"});
        let after = json!({"name": "B", "priority": "High", "updated_at": "t2", "deleted_at": "t2"});
        assert_eq!(
            changed_fields(Some(&before), Some(&after)),
            vec!["deleted_at".to_owned(), "name".to_owned()]
        );
    }

    #[test]
    fn create_lists_every_field() {
        let after = json!({"b": 1, "a": 2});
        assert_eq!(
            changed_fields(None, Some(&after)),
            vec!["a".to_owned(), "b".to_owned()]
        );
    }
}
