use std::collections::HashMap;

use async_trait::async_trait;
use gerbil_application::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};
use gerbil_core::{AppError, AppResult};
use gerbil_domain::{Project, Resource, Task};
use tokio::sync::RwLock;
use uuid::Uuid;


/// In-memory project, resource and task repository.
#[derive(Debug, Default)]
pub struct InMemoryTrackingRepository {
    projects: RwLock<HashMap<Uuid, Project>>,
    resources: RwLock<HashMap<Uuid, Resource>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTrackingRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryTrackingRepository {
    async fn insert_project(&self, project: &Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        let code_taken = projects.values().any(|stored| {
            !stored.is_deleted() && stored.project_code.as_str() == project.project_code.as_str()
        });
        if code_taken {
            return Err(AppError::Conflict(format!(
                "project '{}' already exists",
                project.project_code.as_str()
            )));
        }

        projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        let Some(stored) = projects.get_mut(&project.id) else {
            return Err(AppError::NotFound(format!(
                "project '{}' does not exist",
                project.id
            )));
        };

        *stored = project.clone();
        Ok(())
    }

    async fn find_project(&self, project_id: Uuid) -> AppResult<Option<Project>> {
        Ok(self.projects.read().await.get(&project_id).cloned())
    }

    async fn list_projects(&self, include_deleted: bool) -> AppResult<Vec<Project>> {
        let projects = self.projects.read().await;
        let mut values: Vec<Project> = projects
            .values()
            .filter(|project| include_deleted || !project.is_deleted())
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(values)
    }
}

#[async_trait]
impl ResourceRepository for InMemoryTrackingRepository {
    async fn insert_resource(&self, resource: &Resource) -> AppResult<()> {
        self.resources
            .write()
            .await
            .insert(resource.id, resource.clone());
        Ok(())
    }

    async fn update_resource(&self, resource: &Resource) -> AppResult<()> {
        let mut resources = self.resources.write().await;
        let Some(stored) = resources.get_mut(&resource.id) else {
            return Err(AppError::NotFound(format!(
                "resource '{}' does not exist",
                resource.id
            )));
        };

        *stored = resource.clone();
        Ok(())
    }

    async fn find_resource(&self, resource_id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self.resources.read().await.get(&resource_id).cloned())
    }

    async fn list_resources(&self, include_deleted: bool) -> AppResult<Vec<Resource>> {
        let resources = self.resources.read().await;
        let mut values: Vec<Resource> = resources
            .values()
            .filter(|resource| include_deleted || !resource.is_deleted())
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            left.resource_name
                .as_str()
                .to_lowercase()
                .cmp(&right.resource_name.as_str().to_lowercase())
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(values)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTrackingRepository {
    async fn insert_task(&self, task: &Task) -> AppResult<()> {
        let mut tasks = self.tasks.write().await;
        let code_taken = tasks.values().any(|stored| {
            !stored.is_deleted() && stored.task_code.as_str() == task.task_code.as_str()
        });
        if code_taken {
            return Err(AppError::Conflict(format!(
                "task '{}' already exists",
                task.task_code.as_str()
            )));
        }

        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> AppResult<()> {
        let mut tasks = self.tasks.write().await;
        let Some(stored) = tasks.get_mut(&task.id) else {
            return Err(AppError::NotFound(format!(
                "task '{}' does not exist",
                task.id
            )));
        };

        *stored = task.clone();
        Ok(())
    }

    async fn find_task(&self, task_id: Uuid) -> AppResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&task_id).cloned())
    }

    async fn list_tasks(&self, query: TaskQuery) -> AppResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut values: Vec<Task> = tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(values)
    }
}
