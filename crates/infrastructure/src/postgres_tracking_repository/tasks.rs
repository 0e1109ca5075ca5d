use super::*;

const TASK_COLUMNS: &str = r#"
    id,
    task_code,
    project_id,
    task_name,
    description,
    status,
    priority,
    resource1_id,
    resource2_id,
    r1_estimate_hrs,
    r1_actual_hrs,
    r2_estimate_hrs,
    r2_actual_hrs,
    estimate_days,
    deadline,
    expected_start_date,
    actual_start_date,
    completed_date,
    tags,
    created_at,
    updated_at,
    deleted_at
"#;

impl PostgresTrackingRepository {
    pub(super) async fn insert_task_impl(&self, task: &Task) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id,
                task_code,
                project_id,
                task_name,
                description,
                status,
                priority,
                resource1_id,
                resource2_id,
                r1_estimate_hrs,
                r1_actual_hrs,
                r2_estimate_hrs,
                r2_actual_hrs,
                estimate_days,
                deadline,
                expected_start_date,
                actual_start_date,
                completed_date,
                tags,
                created_at,
                updated_at,
                deleted_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            "#,
        )
        .bind(task.id)
        .bind(task.task_code.as_str())
        .bind(task.project_id)
        .bind(task.task_name.as_str())
        .bind(task.description.as_deref())
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.resource1_id)
        .bind(task.resource2_id)
        .bind(task.r1_estimate_hrs)
        .bind(task.r1_actual_hrs)
        .bind(task.r2_estimate_hrs)
        .bind(task.r2_actual_hrs)
        .bind(task.estimate_days)
        .bind(task.deadline)
        .bind(task.expected_start_date)
        .bind(task.actual_start_date)
        .bind(task.completed_date)
        .bind(&task.tags)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                &format!("failed to insert task '{}'", task.task_code.as_str()),
                error,
            )
        })?;

        Ok(())
    }

    pub(super) async fn update_task_impl(&self, task: &Task) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET
                task_name = $2,
                description = $3,
                status = $4,
                priority = $5,
                resource1_id = $6,
                resource2_id = $7,
                r1_estimate_hrs = $8,
                r1_actual_hrs = $9,
                r2_estimate_hrs = $10,
                r2_actual_hrs = $11,
                estimate_days = $12,
                deadline = $13,
                expected_start_date = $14,
                actual_start_date = $15,
                completed_date = $16,
                tags = $17,
                updated_at = $18,
                deleted_at = $19
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(task.task_name.as_str())
        .bind(task.description.as_deref())
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.resource1_id)
        .bind(task.resource2_id)
        .bind(task.r1_estimate_hrs)
        .bind(task.r1_actual_hrs)
        .bind(task.r2_estimate_hrs)
        .bind(task.r2_actual_hrs)
        .bind(task.estimate_days)
        .bind(task.deadline)
        .bind(task.expected_start_date)
        .bind(task.actual_start_date)
        .bind(task.completed_date)
        .bind(&task.tags)
        .bind(task.updated_at)
        .bind(task.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(&format!("failed to update task '{}'", task.id), error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("task '{}' does not exist", task.id)));
        }

        Ok(())
    }

    pub(super) async fn find_task_impl(&self, task_id: Uuid) -> AppResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find task '{task_id}': {error}")))?;

        row.map(Task::try_from).transpose()
    }

    pub(super) async fn list_tasks_impl(&self, query: TaskQuery) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE ($1 OR deleted_at IS NULL)
              AND ($2::UUID IS NULL OR project_id = $2)
              AND ($3::UUID IS NULL OR resource1_id = $3 OR resource2_id = $3)
              AND ($4::TEXT IS NULL OR status = $4)
            ORDER BY created_at DESC, id ASC
            "#
        ))
        .bind(query.include_deleted)
        .bind(query.project_id)
        .bind(query.resource_id)
        .bind(query.status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list tasks: {error}")))?;

        rows.into_iter().map(Task::try_from).collect()
    }
}
