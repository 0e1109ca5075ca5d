use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{
    AuditAction, AuditEntityType, Project, ProjectChanges, ProjectInput, ProjectProgress, Task,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::audit_service::{AuditTrail, AuditedWrite};
use crate::tracking_ports::{ProjectRepository, TaskQuery, TaskRepository};
use crate::views::ProjectView;
use crate::workflow_hooks::WorkflowHooks;
use crate::workflow_ports::WorkflowEventKind;

#[cfg(test)]
mod tests;

/// Application service for project CRUD.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    audit: AuditTrail,
    hooks: WorkflowHooks,
}

impl ProjectService {
    /// Creates a new project service.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        audit: AuditTrail,
        hooks: WorkflowHooks,
    ) -> Self {
        Self {
            projects,
            tasks,
            audit,
            hooks,
        }
    }

    /// Creates a project.
    pub async fn create_project(&self, actor: &Actor, input: ProjectInput) -> AppResult<ProjectView> {
        let project = Project::new(input, Utc::now())?;
        self.projects.insert_project(&project).await?;
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::Project,
                    entity_id: &project.id,
                    label: project.project_code.as_str(),
                    action: AuditAction::Create,
                    before: None,
                    after: Some(&project),
                },
            )
            .await?;

        info!(
            project_id = %project.id,
            project_code = %project.project_code.as_str(),
            "project created"
        );
        self.hooks
            .publish(
                WorkflowEventKind::ProjectCreated,
                json!({
                    "id": project.id,
                    "project_id": project.project_code.as_str(),
                    "name": project.name.as_str(),
                    "priority": project.priority.as_str(),
                }),
            )
            .await;

        Ok(ProjectView {
            project,
            progress: ProjectProgress::default(),
        })
    }

    /// Lists live projects, newest first.
    pub async fn list_projects(&self) -> AppResult<Vec<ProjectView>> {
        let projects = self.projects.list_projects(false).await?;
        let tasks = self.tasks.list_tasks(TaskQuery::default()).await?;

        let mut tasks_by_project: HashMap<Uuid, Vec<&Task>> = HashMap::new();
        for task in &tasks {
            tasks_by_project.entry(task.project_id).or_default().push(task);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let progress = tasks_by_project
                    .get(&project.id)
                    .map(|tasks| ProjectProgress::from_tasks(tasks.iter().copied()))
                    .unwrap_or_default();
                ProjectView { project, progress }
            })
            .collect())
    }

    /// Returns one project. Soft-deleted projects remain readable.
    pub async fn get_project(&self, project_id: Uuid) -> AppResult<ProjectView> {
        let project = self.load(project_id).await?;
        self.view(project).await
    }

    /// Applies a partial update to a live project.
    pub async fn update_project(
        &self,
        actor: &Actor,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> AppResult<ProjectView> {
        let before = self.load_live(project_id).await?;
        let mut project = before.clone();
        project.apply(changes, Utc::now())?;

        self.projects.update_project(&project).await?;
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::Project,
                    entity_id: &project.id,
                    label: project.project_code.as_str(),
                    action: AuditAction::Update,
                    before: Some(&before),
                    after: Some(&project),
                },
            )
            .await?;

        info!(project_id = %project.id, "project updated");
        self.hooks
            .publish(
                WorkflowEventKind::ProjectUpdated,
                json!({
                    "id": project.id,
                    "project_id": project.project_code.as_str(),
                    "status": project.status.as_str(),
                }),
            )
            .await;

        self.view(project).await
    }

    /// Soft-deletes a project that owns no live tasks.
    pub async fn delete_project(&self, actor: &Actor, project_id: Uuid) -> AppResult<ProjectView> {
        let before = self.load(project_id).await?;
        let live_tasks = self.tasks.list_tasks(TaskQuery::for_project(project_id)).await?;
        if !before.is_deleted() && !live_tasks.is_empty() {
            return Err(AppError::Conflict(format!(
                "project '{}' still has {} active task(s); delete them first",
                before.project_code.as_str(),
                live_tasks.len()
            )));
        }

        let mut project = before.clone();
        project.soft_delete(Utc::now())?;

        self.projects.update_project(&project).await?;
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::Project,
                    entity_id: &project.id,
                    label: project.project_code.as_str(),
                    action: AuditAction::Delete,
                    before: Some(&before),
                    after: Some(&project),
                },
            )
            .await?;

        info!(project_id = %project.id, "project deleted");
        self.hooks
            .publish(
                WorkflowEventKind::ProjectDeleted,
                json!({ "id": project.id, "project_id": project.project_code.as_str() }),
            )
            .await;

        Ok(ProjectView {
            project,
            progress: ProjectProgress::default(),
        })
    }

    pub(crate) async fn load(&self, project_id: Uuid) -> AppResult<Project> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    async fn load_live(&self, project_id: Uuid) -> AppResult<Project> {
        let project = self.load(project_id).await?;
        if project.is_deleted() {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' has been deleted"
            )));
        }

        Ok(project)
    }

    async fn view(&self, project: Project) -> AppResult<ProjectView> {
        let tasks = self.tasks.list_tasks(TaskQuery::for_project(project.id)).await?;
        Ok(ProjectView {
            progress: ProjectProgress::from_tasks(&tasks),
            project,
        })
    }
}
