use async_trait::async_trait;
use gerbil_core::AppResult;
use gerbil_domain::{Project, Resource, Task, TaskStatus};
use uuid::Uuid;

/// Port for project persistence.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project. Fails with a conflict when a live project already uses its code.
    async fn insert_project(&self, project: &Project) -> AppResult<()>;

    /// Overwrites an existing project.
    async fn update_project(&self, project: &Project) -> AppResult<()>;

    /// Finds a project by storage id, including soft-deleted rows.
    async fn find_project(&self, project_id: Uuid) -> AppResult<Option<Project>>;

    /// Lists projects, newest first.
    async fn list_projects(&self, include_deleted: bool) -> AppResult<Vec<Project>>;
}

/// Port for resource persistence.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Stores a new resource.
    async fn insert_resource(&self, resource: &Resource) -> AppResult<()>;

    /// Overwrites an existing resource.
    async fn update_resource(&self, resource: &Resource) -> AppResult<()>;

    /// Finds a resource by storage id, including soft-deleted rows.
    async fn find_resource(&self, resource_id: Uuid) -> AppResult<Option<Resource>>;

    /// Lists resources ordered by name.
    async fn list_resources(&self, include_deleted: bool) -> AppResult<Vec<Resource>>;
}

/// Filters for task listing. Every set field must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Owning project.
    pub project_id: Option<Uuid>,
    /// Either assignee.
    pub resource_id: Option<Uuid>,
    /// Current status.
    pub status: Option<TaskStatus>,
    /// Include soft-deleted tasks.
    pub include_deleted: bool,
}

impl TaskQuery {
    /// Live tasks of one project.
    #[must_use]
    pub fn for_project(project_id: Uuid) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Live tasks assigned to one resource.
    #[must_use]
    pub fn for_resource(resource_id: Uuid) -> Self {
        Self {
            resource_id: Some(resource_id),
            ..Self::default()
        }
    }

    /// Returns whether a task satisfies the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        (self.include_deleted || !task.is_deleted())
            && self.project_id.is_none_or(|project_id| task.project_id == project_id)
            && self.resource_id.is_none_or(|resource_id| task.is_assigned_to(resource_id))
            && self.status.is_none_or(|status| task.status == status)
    }
}

/// Port for task persistence.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task. Fails with a conflict when a live task already uses its code.
    async fn insert_task(&self, task: &Task) -> AppResult<()>;

    /// Overwrites an existing task.
    async fn update_task(&self, task: &Task) -> AppResult<()>;

    /// Finds a task by storage id, including soft-deleted rows.
    async fn find_task(&self, task_id: Uuid) -> AppResult<Option<Task>>;

    /// Lists tasks matching the query, newest first.
    async fn list_tasks(&self, query: TaskQuery) -> AppResult<Vec<Task>>;
}
