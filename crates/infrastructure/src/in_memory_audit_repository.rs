use async_trait::async_trait;
use chrono::Utc;
use gerbil_application::{AuditEntry, AuditEvent, AuditLogQuery, AuditRepository};
use gerbil_core::AppResult;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory append-only audit trail.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.entries.write().await.push(AuditEntry {
            id: Uuid::new_v4(),
            event,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_entries(&self, query: &AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use gerbil_application::{AuditEvent, AuditLogQuery, AuditRepository};
    use gerbil_core::Actor;
    use gerbil_domain::{AuditAction, AuditEntityType};

    use super::InMemoryAuditRepository;

    fn event(entity_id: &str, action: AuditAction) -> AuditEvent {
        AuditEvent {
            entity_type: AuditEntityType::Project,
            entity_id: entity_id.to_owned(),
            action,
            before: None,
            after: None,
            changed_fields: Vec::new(),
            summary: format!("{} project {entity_id}", action.as_str()),
            actor: Actor::system(),
        }
    }

    #[tokio::test]
    async fn entries_are_newest_first_and_filtered() {
        let repository = InMemoryAuditRepository::new();
        assert!(repository.append_event(event("p-1", AuditAction::Create)).await.is_ok());
        assert!(repository.append_event(event("p-2", AuditAction::Create)).await.is_ok());
        assert!(repository.append_event(event("p-1", AuditAction::Update)).await.is_ok());

        let entries = repository
            .list_entries(&AuditLogQuery {
                entity_id: Some("p-1".to_owned()),
                ..AuditLogQuery::default()
            })
            .await
            .unwrap_or_default();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.action, AuditAction::Update);
        assert_eq!(entries[1].event.action, AuditAction::Create);
        assert_eq!(entries[0].event.actor.as_str(), "system");
    }
}
