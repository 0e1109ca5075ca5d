use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gerbil_application::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};
use gerbil_core::{AppError, AppResult, NonEmptyString};
use gerbil_domain::{
    EmailAddress, Priority, Project, ProjectStatus, Resource, Task, TaskCode, TaskStatus,
    TotalWeight, WeeklyCapacity,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

mod projects;
mod resources;
mod tasks;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed project, resource and task repository.
#[derive(Clone)]
pub struct PostgresTrackingRepository {
    pool: PgPool,
}

impl PostgresTrackingRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps unique-index violations to conflicts and everything else to internal errors.
fn write_error(context: &str, error: sqlx::Error) -> AppError {
    let is_unique_violation = error
        .as_database_error()
        .is_some_and(|database_error| database_error.is_unique_violation());
    if is_unique_violation {
        return AppError::Conflict(format!("{context}: an active row already uses this code"));
    }

    AppError::Internal(format!("{context}: {error}"))
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    project_code: String,
    name: String,
    description: Option<String>,
    priority: String,
    total_weight: i16,
    status: String,
    start_date: Option<NaiveDate>,
    target_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            project_code: NonEmptyString::new(row.project_code)?,
            name: NonEmptyString::new(row.name)?,
            description: row.description,
            priority: Priority::from_str(&row.priority)?,
            total_weight: TotalWeight::new(i64::from(row.total_weight))?,
            status: ProjectStatus::from_str(&row.status)?,
            start_date: row.start_date,
            target_date: row.target_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ResourceRow {
    id: Uuid,
    resource_name: String,
    role: Option<String>,
    department: Option<String>,
    email: Option<String>,
    weekly_capacity_hrs: i16,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = AppError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            resource_name: NonEmptyString::new(row.resource_name)?,
            role: row.role,
            department: row.department,
            email: row.email.map(EmailAddress::new).transpose()?,
            weekly_capacity_hrs: WeeklyCapacity::new(i64::from(row.weekly_capacity_hrs))?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    task_code: String,
    project_id: Uuid,
    task_name: String,
    description: Option<String>,
    status: String,
    priority: String,
    resource1_id: Option<Uuid>,
    resource2_id: Option<Uuid>,
    r1_estimate_hrs: f64,
    r1_actual_hrs: f64,
    r2_estimate_hrs: f64,
    r2_actual_hrs: f64,
    estimate_days: Option<f64>,
    deadline: Option<NaiveDate>,
    expected_start_date: Option<NaiveDate>,
    actual_start_date: Option<NaiveDate>,
    completed_date: Option<NaiveDate>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            task_code: TaskCode::new(row.task_code)?,
            project_id: row.project_id,
            task_name: NonEmptyString::new(row.task_name)?,
            description: row.description,
            status: TaskStatus::from_str(&row.status)?,
            priority: Priority::from_str(&row.priority)?,
            resource1_id: row.resource1_id,
            resource2_id: row.resource2_id,
            r1_estimate_hrs: row.r1_estimate_hrs,
            r1_actual_hrs: row.r1_actual_hrs,
            r2_estimate_hrs: row.r2_estimate_hrs,
            r2_actual_hrs: row.r2_actual_hrs,
            estimate_days: row.estimate_days,
            deadline: row.deadline,
            expected_start_date: row.expected_start_date,
            actual_start_date: row.actual_start_date,
            completed_date: row.completed_date,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[async_trait]
impl ProjectRepository for PostgresTrackingRepository {
    async fn insert_project(&self, project: &Project) -> AppResult<()> {
        self.insert_project_impl(project).await
    }

    async fn update_project(&self, project: &Project) -> AppResult<()> {
        self.update_project_impl(project).await
    }

    async fn find_project(&self, project_id: Uuid) -> AppResult<Option<Project>> {
        self.find_project_impl(project_id).await
    }

    async fn list_projects(&self, include_deleted: bool) -> AppResult<Vec<Project>> {
        self.list_projects_impl(include_deleted).await
    }
}

#[async_trait]
impl ResourceRepository for PostgresTrackingRepository {
    async fn insert_resource(&self, resource: &Resource) -> AppResult<()> {
        self.insert_resource_impl(resource).await
    }

    async fn update_resource(&self, resource: &Resource) -> AppResult<()> {
        self.update_resource_impl(resource).await
    }

    async fn find_resource(&self, resource_id: Uuid) -> AppResult<Option<Resource>> {
        self.find_resource_impl(resource_id).await
    }

    async fn list_resources(&self, include_deleted: bool) -> AppResult<Vec<Resource>> {
        self.list_resources_impl(include_deleted).await
    }
}

#[async_trait]
impl TaskRepository for PostgresTrackingRepository {
    async fn insert_task(&self, task: &Task) -> AppResult<()> {
        self.insert_task_impl(task).await
    }

    async fn update_task(&self, task: &Task) -> AppResult<()> {
        self.update_task_impl(task).await
    }

    async fn find_task(&self, task_id: Uuid) -> AppResult<Option<Task>> {
        self.find_task_impl(task_id).await
    }

    async fn list_tasks(&self, query: TaskQuery) -> AppResult<Vec<Task>> {
        self.list_tasks_impl(query).await
    }
}
