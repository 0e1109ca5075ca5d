use gerbil_application::{AuditEntry, AuditLogQuery};
use gerbil_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::common::{format_timestamp, optional_i64, parse_optional};

/// Audit retrieval filters. Serves both `?entity=&id=` and
/// `?entity=&entityId=` spellings.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQueryRequest {
    #[serde(alias = "entity_type", alias = "entityType")]
    pub entity: Option<String>,
    #[serde(alias = "entityId", alias = "entity_id")]
    pub id: Option<String>,
    pub action: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub offset: Option<i64>,
}

impl TryFrom<AuditLogQueryRequest> for AuditLogQuery {
    type Error = AppError;

    fn try_from(value: AuditLogQueryRequest) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        let paging = |field: &str, raw: Option<i64>, default: usize| {
            raw.map(|raw| {
                usize::try_from(raw).map_err(|_| {
                    AppError::Validation(format!("{field} must be a non-negative integer, got {raw}"))
                })
            })
            .transpose()
            .map(|parsed| parsed.unwrap_or(default))
        };

        Ok(Self {
            entity_type: parse_optional(value.entity)?,
            entity_id: value
                .id
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty()),
            action: parse_optional(value.action)?,
            limit: paging("limit", value.limit, defaults.limit)?,
            offset: paging("offset", value.offset, defaults.offset)?,
        })
    }
}

/// API representation of one audit entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-entry-response.ts"
)]
pub struct AuditEntryResponse {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(rename = "entityId")]
    pub entity_id_alias: String,
    pub action: String,
    #[ts(type = "unknown")]
    pub before: Option<Value>,
    #[ts(type = "unknown")]
    pub after: Option<Value>,
    pub changed_fields: Vec<String>,
    pub summary: String,
    pub user_email: String,
    pub created_at: String,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(value: AuditEntry) -> Self {
        let event = value.event;
        Self {
            id: value.id.to_string(),
            entity_type: event.entity_type.as_str().to_owned(),
            entity_id_alias: event.entity_id.clone(),
            entity_id: event.entity_id,
            action: event.action.as_str().to_owned(),
            before: event.before,
            after: event.after,
            changed_fields: event.changed_fields,
            summary: event.summary,
            user_email: event.actor.as_str().to_owned(),
            created_at: format_timestamp(value.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use gerbil_application::AuditLogQuery;
    use gerbil_domain::{AuditAction, AuditEntityType};

    use super::AuditLogQueryRequest;

    #[test]
    fn plural_entity_names_and_actions_are_accepted() {
        let request = AuditLogQueryRequest {
            entity: Some("Projects".to_owned()),
            id: Some(" 42 ".to_owned()),
            action: Some("update".to_owned()),
            ..AuditLogQueryRequest::default()
        };

        let query = AuditLogQuery::try_from(request);
        assert!(query.is_ok());
        if let Ok(query) = query {
            assert_eq!(query.entity_type, Some(AuditEntityType::Project));
            assert_eq!(query.entity_id.as_deref(), Some("42"));
            assert_eq!(query.action, Some(AuditAction::Update));
            assert_eq!(query.limit, 100);
        }
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let request = AuditLogQueryRequest {
            entity: Some("invoice".to_owned()),
            ..AuditLogQueryRequest::default()
        };
        assert!(AuditLogQuery::try_from(request).is_err());
    }
}
