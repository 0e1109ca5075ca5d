use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gerbil_core::{Actor, AppResult};
use gerbil_domain::{AuditAction, AuditEntityType};
use serde_json::Value;
use uuid::Uuid;

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Audited entity kind.
    pub entity_type: AuditEntityType,
    /// Audited entity identifier.
    pub entity_id: String,
    /// Write kind.
    pub action: AuditAction,
    /// Snapshot before the write.
    pub before: Option<Value>,
    /// Snapshot after the write.
    pub after: Option<Value>,
    /// Top-level fields that differ between the snapshots.
    pub changed_fields: Vec<String>,
    /// One-line description, `ACTION entity label`.
    pub summary: String,
    /// Caller responsible for the write.
    pub actor: Actor,
}

/// Stored audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Recorded event.
    pub event: AuditEvent,
    /// Recording time.
    pub created_at: DateTime<Utc>,
}

/// Filters and paging for audit retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogQuery {
    /// Entity kind.
    pub entity_type: Option<AuditEntityType>,
    /// Entity identifier.
    pub entity_id: Option<String>,
    /// Write kind.
    pub action: Option<AuditAction>,
    /// Page size.
    pub limit: usize,
    /// Rows to skip.
    pub offset: usize,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            entity_type: None,
            entity_id: None,
            action: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl AuditLogQuery {
    /// Returns whether an entry satisfies the filters, ignoring paging.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.entity_type
            .is_none_or(|entity_type| entry.event.entity_type == entity_type)
            && self
                .entity_id
                .as_deref()
                .is_none_or(|entity_id| entry.event.entity_id == entity_id)
            && self.action.is_none_or(|action| entry.event.action == action)
    }
}

/// Port for the append-only audit trail.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;

    /// Lists entries matching the query, newest first.
    async fn list_entries(&self, query: &AuditLogQuery) -> AppResult<Vec<AuditEntry>>;
}
