use gerbil_application::ResourceView;
use gerbil_domain::{ResourceChanges, ResourceInput};

use super::types::{CreateResourceRequest, ResourceResponse, UpdateResourceRequest};
use crate::dto::common::format_timestamp;

impl From<CreateResourceRequest> for ResourceInput {
    fn from(value: CreateResourceRequest) -> Self {
        Self {
            resource_name: value.resource_name.unwrap_or_default(),
            role: value.role,
            department: value.department,
            email: value.email,
            weekly_capacity_hrs: value.weekly_capacity_hrs,
            is_active: value.is_active,
        }
    }
}

impl From<UpdateResourceRequest> for ResourceChanges {
    fn from(value: UpdateResourceRequest) -> Self {
        Self {
            resource_name: value.resource_name,
            role: value.role,
            department: value.department,
            email: value.email,
            weekly_capacity_hrs: value.weekly_capacity_hrs,
            is_active: value.is_active,
        }
    }
}

impl From<ResourceView> for ResourceResponse {
    fn from(value: ResourceView) -> Self {
        let resource = value.resource;
        Self {
            id: resource.id.to_string(),
            resource_name: resource.resource_name.as_str().to_owned(),
            role: resource.role,
            department: resource.department,
            email: resource.email.map(|email| email.as_str().to_owned()),
            weekly_capacity_hrs: resource.weekly_capacity_hrs.hours(),
            is_active: resource.is_active,
            current_allocation_hrs: value.allocation.current_allocation_hrs,
            utilization_pct: value.allocation.utilization_pct,
            active_task_count: value.allocation.active_task_count,
            is_overallocated: value.allocation.is_overallocated,
            created_at: format_timestamp(resource.created_at),
            updated_at: format_timestamp(resource.updated_at),
            deleted_at: resource.deleted_at.map(format_timestamp),
        }
    }
}
