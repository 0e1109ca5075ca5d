use std::sync::Arc;

use chrono::Utc;
use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{
    AuditAction, AuditEntityType, Resource, ResourceAllocation, ResourceChanges, ResourceInput,
};
use tracing::info;
use uuid::Uuid;

use crate::audit_service::{AuditTrail, AuditedWrite};
use crate::tracking_ports::{ResourceRepository, TaskQuery, TaskRepository};
use crate::views::ResourceView;

#[cfg(test)]
mod tests;

/// Application service for resource CRUD.
#[derive(Clone)]
pub struct ResourceService {
    resources: Arc<dyn ResourceRepository>,
    tasks: Arc<dyn TaskRepository>,
    audit: AuditTrail,
}

impl ResourceService {
    /// Creates a new resource service.
    #[must_use]
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        tasks: Arc<dyn TaskRepository>,
        audit: AuditTrail,
    ) -> Self {
        Self {
            resources,
            tasks,
            audit,
        }
    }

    /// Creates a resource.
    pub async fn create_resource(
        &self,
        actor: &Actor,
        input: ResourceInput,
    ) -> AppResult<ResourceView> {
        let resource = Resource::new(input, Utc::now())?;
        self.resources.insert_resource(&resource).await?;
        self.record(actor, AuditAction::Create, None, &resource).await?;

        info!(resource_id = %resource.id, "resource created");
        Ok(ResourceView {
            resource,
            allocation: ResourceAllocation::default(),
        })
    }

    /// Lists live resources with their allocation.
    pub async fn list_resources(&self) -> AppResult<Vec<ResourceView>> {
        let resources = self.resources.list_resources(false).await?;
        let tasks = self.tasks.list_tasks(TaskQuery::default()).await?;

        Ok(resources
            .into_iter()
            .map(|resource| ResourceView {
                allocation: ResourceAllocation::compute(&resource, &tasks),
                resource,
            })
            .collect())
    }

    /// Returns one resource. Soft-deleted resources remain readable.
    pub async fn get_resource(&self, resource_id: Uuid) -> AppResult<ResourceView> {
        let resource = self.load(resource_id).await?;
        self.view(resource).await
    }

    /// Applies a partial update to a live resource.
    pub async fn update_resource(
        &self,
        actor: &Actor,
        resource_id: Uuid,
        changes: ResourceChanges,
    ) -> AppResult<ResourceView> {
        let before = self.load(resource_id).await?;
        if before.is_deleted() {
            return Err(AppError::NotFound(format!(
                "resource '{resource_id}' has been deleted"
            )));
        }

        let mut resource = before.clone();
        resource.apply(changes, Utc::now())?;
        self.resources.update_resource(&resource).await?;
        self.record(actor, AuditAction::Update, Some(&before), &resource)
            .await?;

        info!(resource_id = %resource.id, "resource updated");
        self.view(resource).await
    }

    /// Soft-deletes a resource and marks it inactive.
    pub async fn delete_resource(&self, actor: &Actor, resource_id: Uuid) -> AppResult<ResourceView> {
        let before = self.load(resource_id).await?;
        let mut resource = before.clone();
        resource.soft_delete(Utc::now())?;

        self.resources.update_resource(&resource).await?;
        self.record(actor, AuditAction::Delete, Some(&before), &resource)
            .await?;

        info!(resource_id = %resource.id, "resource deleted");
        self.view(resource).await
    }

    async fn load(&self, resource_id: Uuid) -> AppResult<Resource> {
        self.resources
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("resource '{resource_id}' does not exist")))
    }

    async fn view(&self, resource: Resource) -> AppResult<ResourceView> {
        let tasks = self.tasks.list_tasks(TaskQuery::for_resource(resource.id)).await?;
        Ok(ResourceView {
            allocation: ResourceAllocation::compute(&resource, &tasks),
            resource,
        })
    }

    async fn record(
        &self,
        actor: &Actor,
        action: AuditAction,
        before: Option<&Resource>,
        after: &Resource,
    ) -> AppResult<()> {
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::Resource,
                    entity_id: &after.id,
                    label: after.resource_name.as_str(),
                    action,
                    before,
                    after: Some(after),
                },
            )
            .await
    }
}
