use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gerbil_application::{AuditEntry, AuditEvent, AuditLogQuery, AuditRepository};
use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{AuditAction, AuditEntityType};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    entity_type: String,
    entity_id: String,
    action: String,
    before_state: Option<Json<Value>>,
    after_state: Option<Json<Value>>,
    changed_fields: Vec<String>,
    summary: String,
    user_email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            event: AuditEvent {
                entity_type: AuditEntityType::from_str(&row.entity_type)?,
                entity_id: row.entity_id,
                action: AuditAction::from_str(&row.action)?,
                before: row.before_state.map(|state| state.0),
                after: row.after_state.map(|state| state.0),
                changed_fields: row.changed_fields,
                summary: row.summary,
                actor: Actor::from_optional(Some(row.user_email.as_str())),
            },
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                id,
                entity_type,
                entity_id,
                action,
                before_state,
                after_state,
                changed_fields,
                summary,
                user_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.entity_type.as_str())
        .bind(event.entity_id.as_str())
        .bind(event.action.as_str())
        .bind(event.before.map(Json))
        .bind(event.after.map(Json))
        .bind(&event.changed_fields)
        .bind(event.summary.as_str())
        .bind(event.actor.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }

    async fn list_entries(&self, query: &AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
        let limit = i64::try_from(query.limit)
            .map_err(|error| AppError::Validation(format!("invalid audit limit: {error}")))?;
        let offset = i64::try_from(query.offset)
            .map_err(|error| AppError::Validation(format!("invalid audit offset: {error}")))?;
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT
                id,
                entity_type,
                entity_id,
                action,
                before_state,
                after_state,
                changed_fields,
                summary,
                user_email,
                created_at
            FROM audit_log_entries
            WHERE ($1::TEXT IS NULL OR entity_type = $1)
                AND ($2::TEXT IS NULL OR entity_id = $2)
                AND ($3::TEXT IS NULL OR action = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            OFFSET $5
            "#,
        )
        .bind(query.entity_type.map(|entity_type| entity_type.as_str()))
        .bind(query.entity_id.as_deref())
        .bind(query.action.map(|action| action.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit entries: {error}")))?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}
