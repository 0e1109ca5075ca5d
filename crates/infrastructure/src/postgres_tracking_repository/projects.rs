use super::*;

const PROJECT_COLUMNS: &str = r#"
    id,
    project_code,
    name,
    description,
    priority,
    total_weight,
    status,
    start_date,
    target_date,
    created_at,
    updated_at,
    deleted_at
"#;

impl PostgresTrackingRepository {
    pub(super) async fn insert_project_impl(&self, project: &Project) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                id,
                project_code,
                name,
                description,
                priority,
                total_weight,
                status,
                start_date,
                target_date,
                created_at,
                updated_at,
                deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(project.id)
        .bind(project.project_code.as_str())
        .bind(project.name.as_str())
        .bind(project.description.as_deref())
        .bind(project.priority.as_str())
        .bind(i16::from(project.total_weight.value()))
        .bind(project.status.as_str())
        .bind(project.start_date)
        .bind(project.target_date)
        .bind(project.created_at)
        .bind(project.updated_at)
        .bind(project.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                &format!("failed to insert project '{}'", project.project_code.as_str()),
                error,
            )
        })?;

        Ok(())
    }

    pub(super) async fn update_project_impl(&self, project: &Project) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET
                name = $2,
                description = $3,
                priority = $4,
                total_weight = $5,
                status = $6,
                start_date = $7,
                target_date = $8,
                updated_at = $9,
                deleted_at = $10
            WHERE id = $1
            "#,
        )
        .bind(project.id)
        .bind(project.name.as_str())
        .bind(project.description.as_deref())
        .bind(project.priority.as_str())
        .bind(i16::from(project.total_weight.value()))
        .bind(project.status.as_str())
        .bind(project.start_date)
        .bind(project.target_date)
        .bind(project.updated_at)
        .bind(project.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(&format!("failed to update project '{}'", project.id), error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{}' does not exist",
                project.id
            )));
        }

        Ok(())
    }

    pub(super) async fn find_project_impl(&self, project_id: Uuid) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find project '{project_id}': {error}"))
        })?;

        row.map(Project::try_from).transpose()
    }

    pub(super) async fn list_projects_impl(&self, include_deleted: bool) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE ($1 OR deleted_at IS NULL)
            ORDER BY created_at DESC, id ASC
            "#
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list projects: {error}")))?;

        rows.into_iter().map(Project::try_from).collect()
    }
}
