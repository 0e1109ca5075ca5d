use gerbil_application::ProjectView;
use gerbil_core::AppError;
use gerbil_domain::calendar::parse_optional_date;
use gerbil_domain::{ProjectChanges, ProjectInput};

use super::types::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};
use crate::dto::common::{first_present, format_timestamp, parse_optional};

impl TryFrom<CreateProjectRequest> for ProjectInput {
    type Error = AppError;

    fn try_from(value: CreateProjectRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            project_code: value.project_id.unwrap_or_default(),
            name: first_present([value.name, value.project_name]).unwrap_or_default(),
            description: value.description,
            priority: parse_optional(value.priority)?,
            total_weight: value.total_weight,
            status: parse_optional(value.status)?,
            start_date: parse_optional_date("start_date", value.start_date.as_deref())?,
            target_date: parse_optional_date("target_date", value.target_date.as_deref())?,
        })
    }
}

impl TryFrom<UpdateProjectRequest> for ProjectChanges {
    type Error = AppError;

    fn try_from(value: UpdateProjectRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.or(value.project_name),
            description: value.description,
            priority: parse_optional(value.priority)?,
            total_weight: value.total_weight,
            status: parse_optional(value.status)?,
            start_date: parse_optional_date("start_date", value.start_date.as_deref())?,
            target_date: parse_optional_date("target_date", value.target_date.as_deref())?,
        })
    }
}

impl From<ProjectView> for ProjectResponse {
    fn from(value: ProjectView) -> Self {
        let project = value.project;
        let name = project.name.as_str().to_owned();
        Self {
            id: project.id.to_string(),
            project_id: project.project_code.as_str().to_owned(),
            project_name: name.clone(),
            name,
            description: project.description,
            priority: project.priority.as_str().to_owned(),
            total_weight: project.total_weight.value(),
            status: project.status.as_str().to_owned(),
            start_date: project.start_date.map(|date| date.to_string()),
            target_date: project.target_date.map(|date| date.to_string()),
            total_tasks: value.progress.total_tasks,
            tasks_done: value.progress.tasks_done,
            completion_pct: value.progress.completion_pct,
            created_at: format_timestamp(project.created_at),
            updated_at: format_timestamp(project.updated_at),
            deleted_at: project.deleted_at.map(format_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use gerbil_domain::{Priority, ProjectChanges, ProjectInput, ProjectStatus};
    use serde_json::json;

    use super::{CreateProjectRequest, UpdateProjectRequest};

    #[test]
    fn create_accepts_either_name_field_and_string_weight() {
        let request: CreateProjectRequest = serde_json::from_value(json!({
            "project_id": "PRJ-1",
            "project_name": "Apollo",
            "priority": "high",
            "total_weight": "3",
            "start_date": "2026-03-01"
        }))
        .unwrap_or_default();

        let input = ProjectInput::try_from(request).unwrap_or_default();
        assert_eq!(input.project_code, "PRJ-1");
        assert_eq!(input.name, "Apollo");
        assert_eq!(input.priority, Some(Priority::High));
        assert_eq!(input.total_weight, Some(3));
        assert!(input.start_date.is_some());
    }

    #[test]
    fn invalid_priority_and_dates_are_rejected() {
        let request = CreateProjectRequest {
            project_id: Some("PRJ-1".to_owned()),
            name: Some("Apollo".to_owned()),
            priority: Some("Urgent".to_owned()),
            ..CreateProjectRequest::default()
        };
        assert!(ProjectInput::try_from(request).is_err());

        let request = CreateProjectRequest {
            target_date: Some("31/12/2026".to_owned()),
            ..CreateProjectRequest::default()
        };
        assert!(ProjectInput::try_from(request).is_err());
    }

    #[test]
    fn update_maps_status_and_leaves_absent_fields_empty() {
        let request = UpdateProjectRequest {
            status: Some("on_hold".to_owned()),
            ..UpdateProjectRequest::default()
        };
        let changes = ProjectChanges::try_from(request).unwrap_or_default();
        assert_eq!(changes.status, Some(ProjectStatus::OnHold));
        assert!(changes.name.is_none());

        let empty = ProjectChanges::try_from(UpdateProjectRequest::default()).unwrap_or_default();
        assert!(empty.is_empty());
    }
}
