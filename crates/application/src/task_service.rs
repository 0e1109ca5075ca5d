use std::sync::Arc;

use chrono::Utc;
use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{
    AuditAction, AuditEntityType, ResourceAllocation, Task, TaskChanges, TaskInput, TaskStatus,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit_service::{AuditTrail, AuditedWrite};
use crate::tracking_ports::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};
use crate::views::{TaskMutation, TaskView};
use crate::workflow_hooks::WorkflowHooks;
use crate::workflow_ports::WorkflowEventKind;

#[cfg(test)]
mod tests;

/// Application service for task CRUD and status transitions.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    resources: Arc<dyn ResourceRepository>,
    audit: AuditTrail,
    hooks: WorkflowHooks,
}

fn view(task: Task) -> TaskView {
    let is_overdue = task.is_overdue(Utc::now().date_naive());
    TaskView { task, is_overdue }
}

impl TaskService {
    /// Creates a new task service.
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        resources: Arc<dyn ResourceRepository>,
        audit: AuditTrail,
        hooks: WorkflowHooks,
    ) -> Self {
        Self {
            tasks,
            projects,
            resources,
            audit,
            hooks,
        }
    }

    /// Creates a task inside a live project.
    pub async fn create_task(&self, actor: &Actor, input: TaskInput) -> AppResult<TaskMutation> {
        self.ensure_live_project(input.project_id).await?;
        for resource_id in [input.resource1_id, input.resource2_id].into_iter().flatten() {
            self.ensure_live_resource(resource_id).await?;
        }

        let task = Task::new(input, Utc::now())?;
        self.tasks.insert_task(&task).await?;
        self.record(actor, AuditAction::Create, None, &task).await?;

        info!(
            task_id = %task.id,
            task_code = %task.task_code.as_str(),
            project_id = %task.project_id,
            status = %task.status,
            "task created"
        );
        self.hooks
            .publish(WorkflowEventKind::TaskCreated, task_payload(&task))
            .await;

        let warnings = self.capacity_warnings(&task).await?;
        Ok(TaskMutation {
            view: view(task),
            warnings,
        })
    }

    /// Lists tasks matching the query, newest first.
    pub async fn list_tasks(&self, query: TaskQuery) -> AppResult<Vec<TaskView>> {
        Ok(self
            .tasks
            .list_tasks(query)
            .await?
            .into_iter()
            .map(view)
            .collect())
    }

    /// Returns one task. Soft-deleted tasks remain readable.
    pub async fn get_task(&self, task_id: Uuid) -> AppResult<TaskView> {
        self.load(task_id).await.map(view)
    }

    /// Applies a partial update, enforcing the status state machine.
    pub async fn update_task(
        &self,
        actor: &Actor,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> AppResult<TaskMutation> {
        let before = self.load(task_id).await?;
        if before.is_deleted() {
            return Err(AppError::NotFound(format!("task '{task_id}' has been deleted")));
        }
        for resource_id in [changes.resource1_id, changes.resource2_id].into_iter().flatten() {
            self.ensure_live_resource(resource_id).await?;
        }

        let now = Utc::now();
        let mut task = before.clone();
        if let Err(error) = task.apply(changes, now.date_naive(), now) {
            if matches!(error, AppError::InvalidTransition(_)) {
                warn!(task_id = %task_id, from = %before.status, error = %error, "task transition rejected");
            }
            return Err(error);
        }

        self.tasks.update_task(&task).await?;
        self.record(actor, AuditAction::Update, Some(&before), &task)
            .await?;

        if before.status != task.status {
            info!(task_id = %task.id, from = %before.status, to = %task.status, "task status changed");
        }
        self.hooks
            .publish(WorkflowEventKind::TaskUpdated, task_payload(&task))
            .await;
        if before.status != TaskStatus::Done && task.status == TaskStatus::Done {
            self.hooks
                .publish(WorkflowEventKind::TaskCompleted, task_payload(&task))
                .await;
        }

        let warnings = self.capacity_warnings(&task).await?;
        Ok(TaskMutation {
            view: view(task),
            warnings,
        })
    }

    /// Soft-deletes a task and cancels it.
    pub async fn delete_task(&self, actor: &Actor, task_id: Uuid) -> AppResult<TaskView> {
        let before = self.load(task_id).await?;
        let mut task = before.clone();
        task.soft_delete(Utc::now())?;

        self.tasks.update_task(&task).await?;
        self.record(actor, AuditAction::Delete, Some(&before), &task)
            .await?;

        info!(task_id = %task.id, "task deleted");
        Ok(view(task))
    }

    async fn load(&self, task_id: Uuid) -> AppResult<Task> {
        self.tasks
            .find_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))
    }

    async fn ensure_live_project(&self, project_id: Uuid) -> AppResult<()> {
        match self.projects.find_project(project_id).await? {
            Some(project) if !project.is_deleted() => Ok(()),
            _ => Err(AppError::Validation(format!(
                "project_id '{project_id}' does not reference an active project"
            ))),
        }
    }

    async fn ensure_live_resource(&self, resource_id: Uuid) -> AppResult<()> {
        match self.resources.find_resource(resource_id).await? {
            Some(resource) if !resource.is_deleted() => Ok(()),
            _ => Err(AppError::Validation(format!(
                "resource '{resource_id}' does not reference an active resource"
            ))),
        }
    }

    async fn capacity_warnings(&self, task: &Task) -> AppResult<Vec<String>> {
        let mut warnings = Vec::new();
        for resource_id in task.assignees() {
            let Some(resource) = self.resources.find_resource(resource_id).await? else {
                continue;
            };
            let assigned = self.tasks.list_tasks(TaskQuery::for_resource(resource_id)).await?;
            let allocation = ResourceAllocation::compute(&resource, &assigned);
            if !allocation.is_overallocated {
                continue;
            }

            warnings.push(format!(
                "resource '{}' is over-allocated: {:.1} of {} weekly hours",
                resource.resource_name.as_str(),
                allocation.current_allocation_hrs,
                resource.weekly_capacity_hrs.hours()
            ));
            self.hooks
                .publish(
                    WorkflowEventKind::ResourceOverallocated,
                    json!({
                        "resource_id": resource.id,
                        "resource_name": resource.resource_name.as_str(),
                        "current_allocation_hrs": allocation.current_allocation_hrs,
                        "weekly_capacity_hrs": resource.weekly_capacity_hrs.hours(),
                    }),
                )
                .await;
        }

        Ok(warnings)
    }

    async fn record(
        &self,
        actor: &Actor,
        action: AuditAction,
        before: Option<&Task>,
        after: &Task,
    ) -> AppResult<()> {
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::Task,
                    entity_id: &after.id,
                    label: after.task_code.as_str(),
                    action,
                    before,
                    after: Some(after),
                },
            )
            .await
    }
}

fn task_payload(task: &Task) -> serde_json::Value {
    json!({
        "id": task.id,
        "task_id": task.task_code.as_str(),
        "project_id": task.project_id,
        "task_name": task.task_name.as_str(),
        "status": task.status.as_str(),
        "resource1_uuid": task.resource1_id,
        "resource2_uuid": task.resource2_id,
    })
}
