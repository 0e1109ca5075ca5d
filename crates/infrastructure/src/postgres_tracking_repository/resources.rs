use super::*;

const RESOURCE_COLUMNS: &str = r#"
    id,
    resource_name,
    role,
    department,
    email,
    weekly_capacity_hrs,
    is_active,
    created_at,
    updated_at,
    deleted_at
"#;

fn capacity(resource: &Resource) -> AppResult<i16> {
    i16::try_from(resource.weekly_capacity_hrs.hours()).map_err(|error| {
        AppError::Internal(format!("invalid weekly capacity for storage: {error}"))
    })
}

impl PostgresTrackingRepository {
    pub(super) async fn insert_resource_impl(&self, resource: &Resource) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO resources (
                id,
                resource_name,
                role,
                department,
                email,
                weekly_capacity_hrs,
                is_active,
                created_at,
                updated_at,
                deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(resource.id)
        .bind(resource.resource_name.as_str())
        .bind(resource.role.as_deref())
        .bind(resource.department.as_deref())
        .bind(resource.email.as_ref().map(EmailAddress::as_str))
        .bind(capacity(resource)?)
        .bind(resource.is_active)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .bind(resource.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(&format!("failed to insert resource '{}'", resource.id), error)
        })?;

        Ok(())
    }

    pub(super) async fn update_resource_impl(&self, resource: &Resource) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE resources
            SET
                resource_name = $2,
                role = $3,
                department = $4,
                email = $5,
                weekly_capacity_hrs = $6,
                is_active = $7,
                updated_at = $8,
                deleted_at = $9
            WHERE id = $1
            "#,
        )
        .bind(resource.id)
        .bind(resource.resource_name.as_str())
        .bind(resource.role.as_deref())
        .bind(resource.department.as_deref())
        .bind(resource.email.as_ref().map(EmailAddress::as_str))
        .bind(capacity(resource)?)
        .bind(resource.is_active)
        .bind(resource.updated_at)
        .bind(resource.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(&format!("failed to update resource '{}'", resource.id), error)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "resource '{}' does not exist",
                resource.id
            )));
        }

        Ok(())
    }

    pub(super) async fn find_resource_impl(&self, resource_id: Uuid) -> AppResult<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1"
        ))
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find resource '{resource_id}': {error}"))
        })?;

        row.map(Resource::try_from).transpose()
    }

    pub(super) async fn list_resources_impl(&self, include_deleted: bool) -> AppResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            r#"
            SELECT {RESOURCE_COLUMNS}
            FROM resources
            WHERE ($1 OR deleted_at IS NULL)
            ORDER BY lower(resource_name) ASC, id ASC
            "#
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list resources: {error}")))?;

        rows.into_iter().map(Resource::try_from).collect()
    }
}
