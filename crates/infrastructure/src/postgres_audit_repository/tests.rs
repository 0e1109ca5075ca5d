use gerbil_application::{AuditEvent, AuditLogQuery, AuditRepository};
use gerbil_core::Actor;
use gerbil_domain::{AuditAction, AuditEntityType};
use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresAuditRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres audit tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn entries_are_listed_newest_first_for_an_entity() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuditRepository::new(pool);
    let entity_id = Uuid::new_v4().to_string();
    let create = AuditEvent {
        entity_type: AuditEntityType::Task,
        entity_id: entity_id.clone(),
        action: AuditAction::Create,
        before: None,
        after: Some(json!({"status": "Backlog"})),
        changed_fields: Vec::new(),
        summary: "CREATE task TSK-AUDIT".to_owned(),
        actor: Actor::from_optional(Some("qa@gerbil.qc")),
    };
    let update = AuditEvent {
        action: AuditAction::Update,
        before: Some(json!({"status": "Backlog"})),
        after: Some(json!({"status": "In Progress"})),
        changed_fields: vec!["status".to_owned()],
        summary: "UPDATE task TSK-AUDIT".to_owned(),
        ..create.clone()
    };
    assert!(repository.append_event(create).await.is_ok());
    assert!(repository.append_event(update).await.is_ok());

    let entries = repository
        .list_entries(&AuditLogQuery {
            entity_type: Some(AuditEntityType::Task),
            entity_id: Some(entity_id.clone()),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].event.action, AuditAction::Update);
    assert_eq!(entries[0].event.changed_fields, vec!["status".to_owned()]);
    assert_eq!(entries[0].event.actor.as_str(), "qa@gerbil.qc");
    assert_eq!(entries[1].event.before, None);

    let updates_only = repository
        .list_entries(&AuditLogQuery {
            entity_id: Some(entity_id),
            action: Some(AuditAction::Update),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(updates_only.len(), 1);
}
