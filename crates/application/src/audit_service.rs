use std::fmt::Display;
use std::sync::Arc;

use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{AuditAction, AuditEntityType, changed_fields};
use serde::Serialize;
use serde_json::Value;

use crate::audit_ports::{AuditEntry, AuditEvent, AuditLogQuery, AuditRepository};

/// Largest audit page a caller can request.
pub const MAX_AUDIT_PAGE_SIZE: usize = 500;

/// Records before/after snapshots for audited writes.
#[derive(Clone)]
pub struct AuditTrail {
    repository: Arc<dyn AuditRepository>,
}

/// One audited write, before it is turned into an [`AuditEvent`].
pub struct AuditedWrite<'a, T: Serialize> {
    /// Entity kind.
    pub entity_type: AuditEntityType,
    /// Entity identifier.
    pub entity_id: &'a (dyn Display + Sync),
    /// Human-facing label used in the summary.
    pub label: &'a str,
    /// Write kind.
    pub action: AuditAction,
    /// State before the write.
    pub before: Option<&'a T>,
    /// State after the write.
    pub after: Option<&'a T>,
}

fn snapshot<T: Serialize>(value: Option<&T>) -> AppResult<Option<Value>> {
    value
        .map(serde_json::to_value)
        .transpose()
        .map_err(|error| AppError::Internal(format!("failed to snapshot audited entity: {error}")))
}

impl AuditTrail {
    /// Creates an audit trail over a repository.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Appends one entry for a write.
    pub async fn record<T: Serialize>(&self, actor: &Actor, write: AuditedWrite<'_, T>) -> AppResult<()> {
        let before = snapshot(write.before)?;
        let after = snapshot(write.after)?;
        let changed_fields = changed_fields(before.as_ref(), after.as_ref());

        self.repository
            .append_event(AuditEvent {
                entity_type: write.entity_type,
                entity_id: write.entity_id.to_string(),
                action: write.action,
                before,
                after,
                changed_fields,
                summary: format!(
                    "{} {} {}",
                    write.action.as_str(),
                    write.entity_type.as_str(),
                    write.label
                ),
                actor: actor.clone(),
            })
            .await
    }
}

/// Read access to the audit trail.
#[derive(Clone)]
pub struct AuditLogService {
    repository: Arc<dyn AuditRepository>,
}

impl AuditLogService {
    /// Creates a new audit log service.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Lists entries, newest first. The page size is clamped to 1..=500.
    pub async fn list_entries(&self, mut query: AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
        query.limit = query.limit.clamp(1, MAX_AUDIT_PAGE_SIZE);
        self.repository.list_entries(&query).await
    }
}
