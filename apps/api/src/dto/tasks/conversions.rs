use gerbil_application::{TaskMutation, TaskQuery, TaskView};
use gerbil_core::AppError;
use gerbil_domain::calendar::parse_optional_date;
use gerbil_domain::{TaskChanges, TaskInput};

use super::types::{
    CreateTaskRequest, TaskListQuery, TaskMutationResponse, TaskResponse, UpdateTaskRequest,
};
use crate::dto::common::{
    first_present, format_timestamp, parse_optional, parse_optional_uuid_field, parse_uuid_field,
};

impl TryFrom<CreateTaskRequest> for TaskInput {
    type Error = AppError;

    fn try_from(value: CreateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            task_code: value.task_id.unwrap_or_default(),
            project_id: parse_uuid_field(
                "project_id",
                first_present([value.project_id, value.project_id_alias]),
            )?,
            task_name: first_present([value.task_name, value.title]).unwrap_or_default(),
            description: value.description.or(value.notes),
            status: parse_optional(value.status)?,
            priority: parse_optional(value.priority)?,
            resource1_id: parse_optional_uuid_field("resource1_uuid", value.resource1_uuid)?,
            resource2_id: parse_optional_uuid_field("resource2_uuid", value.resource2_uuid)?,
            r1_estimate_hrs: value.r1_estimate_hrs,
            r1_actual_hrs: value.r1_actual_hrs,
            r2_estimate_hrs: value.r2_estimate_hrs,
            r2_actual_hrs: value.r2_actual_hrs,
            estimate_days: value.estimate_days,
            deadline: parse_optional_date("deadline", value.deadline.as_deref())?,
            expected_start_date: parse_optional_date(
                "expected_start_date",
                value.expected_start_date.as_deref(),
            )?,
            actual_start_date: parse_optional_date(
                "actual_start_date",
                value.actual_start_date.as_deref(),
            )?,
            completed_date: parse_optional_date("completed_date", value.completed_date.as_deref())?,
            tags: value.tags.unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateTaskRequest> for TaskChanges {
    type Error = AppError;

    fn try_from(value: UpdateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            task_code: value.task_id,
            project_id: parse_optional_uuid_field(
                "project_id",
                first_present([value.project_id, value.project_id_alias]),
            )?,
            task_name: value.task_name.or(value.title),
            description: value.description.or(value.notes),
            status: parse_optional(value.status)?,
            priority: parse_optional(value.priority)?,
            resource1_id: parse_optional_uuid_field("resource1_uuid", value.resource1_uuid)?,
            resource2_id: parse_optional_uuid_field("resource2_uuid", value.resource2_uuid)?,
            r1_estimate_hrs: value.r1_estimate_hrs,
            r1_actual_hrs: value.r1_actual_hrs,
            r2_estimate_hrs: value.r2_estimate_hrs,
            r2_actual_hrs: value.r2_actual_hrs,
            estimate_days: value.estimate_days,
            deadline: parse_optional_date("deadline", value.deadline.as_deref())?,
            expected_start_date: parse_optional_date(
                "expected_start_date",
                value.expected_start_date.as_deref(),
            )?,
            actual_start_date: parse_optional_date(
                "actual_start_date",
                value.actual_start_date.as_deref(),
            )?,
            completed_date: parse_optional_date("completed_date", value.completed_date.as_deref())?,
            tags: value.tags,
        })
    }
}

impl TryFrom<TaskListQuery> for TaskQuery {
    type Error = AppError;

    fn try_from(value: TaskListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: parse_optional_uuid_field("project_id", value.project_id)?,
            resource_id: parse_optional_uuid_field("assignee", value.assignee)?,
            status: parse_optional(value.status)?,
            include_deleted: false,
        })
    }
}

impl From<TaskView> for TaskResponse {
    fn from(value: TaskView) -> Self {
        let task = value.task;
        Self {
            id: task.id.to_string(),
            task_id: task.task_code.as_str().to_owned(),
            project_id: task.project_id.to_string(),
            total_estimate_hrs: task.total_estimate_hrs(),
            total_actual_hrs: task.total_actual_hrs(),
            hours_variance: task.hours_variance(),
            task_name: task.task_name.as_str().to_owned(),
            description: task.description,
            status: task.status.as_str().to_owned(),
            priority: task.priority.as_str().to_owned(),
            resource1_uuid: task.resource1_id.map(|id| id.to_string()),
            resource2_uuid: task.resource2_id.map(|id| id.to_string()),
            r1_estimate_hrs: task.r1_estimate_hrs,
            r1_actual_hrs: task.r1_actual_hrs,
            r2_estimate_hrs: task.r2_estimate_hrs,
            r2_actual_hrs: task.r2_actual_hrs,
            estimate_days: task.estimate_days,
            deadline: task.deadline.map(|date| date.to_string()),
            expected_start_date: task.expected_start_date.map(|date| date.to_string()),
            actual_start_date: task.actual_start_date.map(|date| date.to_string()),
            completed_date: task.completed_date.map(|date| date.to_string()),
            tags: task.tags,
            is_overdue: value.is_overdue,
            created_at: format_timestamp(task.created_at),
            updated_at: format_timestamp(task.updated_at),
            deleted_at: task.deleted_at.map(format_timestamp),
        }
    }
}

impl From<TaskMutation> for TaskMutationResponse {
    fn from(value: TaskMutation) -> Self {
        Self {
            task: TaskResponse::from(value.view),
            warnings: value.warnings,
        }
    }
}
