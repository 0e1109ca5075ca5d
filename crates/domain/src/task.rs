use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use gerbil_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Priority;
use crate::calendar::normalize_optional_text;

/// Maximum task name length.
pub const TASK_NAME_MAX_CHARS: usize = 200;

/// Prefix every task code starts with.
pub const TASK_CODE_PREFIX: &str = "TSK-";

/// Workflow status of a task.
///
/// Tasks only move forward: Backlog, then In Progress, then Done. Cancelled is
/// reachable from any open status. Done and Cancelled are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Backlog,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished.
    Done,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns all statuses in workflow order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[TaskStatus] = &[
            TaskStatus::Backlog,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Cancelled,
        ];

        ALL
    }

    /// Returns the statuses reachable in one step.
    #[must_use]
    pub fn allowed_transitions(&self) -> &'static [Self] {
        match self {
            Self::Backlog => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Done, Self::Cancelled],
            Self::Done | Self::Cancelled => &[],
        }
    }

    /// Returns whether a task may move from `self` to `next`. Staying put is always allowed.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        *self == next || self.allowed_transitions().contains(&next)
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Returns whether the task still represents planned work.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Backlog | Self::InProgress)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "backlog" => Ok(Self::Backlog),
            "in progress" | "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "status must be one of Backlog, In Progress, Done, Cancelled, got '{value}'"
            ))),
        }
    }
}

/// Task code in `TSK-[A-Z0-9-]+` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskCode(String);

impl TaskCode {
    /// Creates a validated task code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let suffix = trimmed.strip_prefix(TASK_CODE_PREFIX).unwrap_or_default();
        let suffix_valid = !suffix.is_empty()
            && suffix
                .chars()
                .all(|character| character.is_ascii_uppercase() || character.is_ascii_digit() || character == '-');

        if !suffix_valid {
            return Err(AppError::Validation(format!(
                "task_id must match TSK-[A-Z0-9-]+, got '{value}'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn validate_hours(field: &str, value: f64) -> AppResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }

    Ok(value)
}

fn validate_estimate_days(value: Option<f64>) -> AppResult<Option<f64>> {
    match value {
        Some(days) if !days.is_finite() || days <= 0.0 => Err(AppError::Validation(
            "estimate_days must be greater than zero".to_owned(),
        )),
        other => Ok(other),
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// A unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Storage identifier.
    pub id: Uuid,
    /// Human-facing task code, exposed as `task_id`.
    #[serde(rename = "task_id")]
    pub task_code: TaskCode,
    /// Owning project storage identifier.
    pub project_id: Uuid,
    /// Display name.
    pub task_name: NonEmptyString,
    /// Free-form notes.
    pub description: Option<String>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
    /// Primary assignee.
    #[serde(rename = "resource1_uuid")]
    pub resource1_id: Option<Uuid>,
    /// Secondary assignee.
    #[serde(rename = "resource2_uuid")]
    pub resource2_id: Option<Uuid>,
    /// Primary assignee estimate.
    pub r1_estimate_hrs: f64,
    /// Primary assignee actuals.
    pub r1_actual_hrs: f64,
    /// Secondary assignee estimate.
    pub r2_estimate_hrs: f64,
    /// Secondary assignee actuals.
    pub r2_actual_hrs: f64,
    /// Calendar estimate.
    pub estimate_days: Option<f64>,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Planned start.
    pub expected_start_date: Option<NaiveDate>,
    /// Actual start.
    pub actual_start_date: Option<NaiveDate>,
    /// Completion date, required once Done.
    pub completed_date: Option<NaiveDate>,
    /// Labels.
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInput {
    /// Task code.
    pub task_code: String,
    /// Owning project.
    pub project_id: Uuid,
    /// Display name.
    pub task_name: String,
    /// Notes.
    pub description: Option<String>,
    /// Initial status, defaults to Backlog.
    pub status: Option<TaskStatus>,
    /// Priority, defaults to Medium.
    pub priority: Option<Priority>,
    /// Primary assignee.
    pub resource1_id: Option<Uuid>,
    /// Secondary assignee.
    pub resource2_id: Option<Uuid>,
    /// Primary estimate.
    pub r1_estimate_hrs: Option<f64>,
    /// Primary actuals.
    pub r1_actual_hrs: Option<f64>,
    /// Secondary estimate.
    pub r2_estimate_hrs: Option<f64>,
    /// Secondary actuals.
    pub r2_actual_hrs: Option<f64>,
    /// Calendar estimate.
    pub estimate_days: Option<f64>,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Planned start.
    pub expected_start_date: Option<NaiveDate>,
    /// Actual start.
    pub actual_start_date: Option<NaiveDate>,
    /// Completion date.
    pub completed_date: Option<NaiveDate>,
    /// Labels.
    pub tags: Vec<String>,
}

/// Partial update for a task. `None` leaves the field untouched.
///
/// `task_code` and `project_id` are accepted only when they repeat the
/// stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    /// Echoed task code.
    pub task_code: Option<String>,
    /// Echoed project.
    pub project_id: Option<Uuid>,
    /// New display name.
    pub task_name: Option<String>,
    /// New notes.
    pub description: Option<String>,
    /// Requested status.
    pub status: Option<TaskStatus>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New primary assignee.
    pub resource1_id: Option<Uuid>,
    /// New secondary assignee.
    pub resource2_id: Option<Uuid>,
    /// New primary estimate.
    pub r1_estimate_hrs: Option<f64>,
    /// New primary actuals.
    pub r1_actual_hrs: Option<f64>,
    /// New secondary estimate.
    pub r2_estimate_hrs: Option<f64>,
    /// New secondary actuals.
    pub r2_actual_hrs: Option<f64>,
    /// New calendar estimate.
    pub estimate_days: Option<f64>,
    /// New due date.
    pub deadline: Option<NaiveDate>,
    /// New planned start.
    pub expected_start_date: Option<NaiveDate>,
    /// New actual start.
    pub actual_start_date: Option<NaiveDate>,
    /// New completion date.
    pub completed_date: Option<NaiveDate>,
    /// New labels.
    pub tags: Option<Vec<String>>,
}

impl TaskChanges {
    /// Returns whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Task {
    /// Creates a validated task.
    pub fn new(input: TaskInput, now: DateTime<Utc>) -> AppResult<Self> {
        let status = input.status.unwrap_or_default();
        if status == TaskStatus::Done && input.completed_date.is_none() {
            return Err(AppError::Validation(
                "completed_date is required when creating a task with status Done".to_owned(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            task_code: TaskCode::new(input.task_code)?,
            project_id: input.project_id,
            task_name: NonEmptyString::bounded(input.task_name, "task_name", TASK_NAME_MAX_CHARS)?,
            description: normalize_optional_text("description", input.description, 5_000)?,
            status,
            priority: input.priority.unwrap_or_default(),
            resource1_id: input.resource1_id,
            resource2_id: input.resource2_id,
            r1_estimate_hrs: validate_hours("r1_estimate_hrs", input.r1_estimate_hrs.unwrap_or(0.0))?,
            r1_actual_hrs: validate_hours("r1_actual_hrs", input.r1_actual_hrs.unwrap_or(0.0))?,
            r2_estimate_hrs: validate_hours("r2_estimate_hrs", input.r2_estimate_hrs.unwrap_or(0.0))?,
            r2_actual_hrs: validate_hours("r2_actual_hrs", input.r2_actual_hrs.unwrap_or(0.0))?,
            estimate_days: validate_estimate_days(input.estimate_days)?,
            deadline: input.deadline,
            expected_start_date: input.expected_start_date,
            actual_start_date: input.actual_start_date,
            completed_date: input.completed_date,
            tags: normalize_tags(input.tags),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Returns whether the task has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies a patch, enforcing the status state machine.
    ///
    /// Returns [`AppError::InvalidTransition`] for a disallowed status move and
    /// leaves the task untouched on any error. Entering In Progress stamps
    /// `actual_start_date` with `today` when unset.
    pub fn apply(&mut self, changes: TaskChanges, today: NaiveDate, now: DateTime<Utc>) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_owned()));
        }

        if let Some(task_code) = changes.task_code.as_deref() {
            if task_code.trim() != self.task_code.as_str() {
                return Err(AppError::Validation("task_id cannot be changed".to_owned()));
            }
        }
        if let Some(project_id) = changes.project_id {
            if project_id != self.project_id {
                return Err(AppError::Validation("project_id cannot be changed".to_owned()));
            }
        }

        let mut next = self.clone();
        if let Some(task_name) = changes.task_name {
            next.task_name = NonEmptyString::bounded(task_name, "task_name", TASK_NAME_MAX_CHARS)?;
        }
        if let Some(description) = changes.description {
            next.description = normalize_optional_text("description", Some(description), 5_000)?;
        }
        if let Some(status) = changes.status {
            next.status = status;
        }
        if let Some(priority) = changes.priority {
            next.priority = priority;
        }
        if let Some(resource1_id) = changes.resource1_id {
            next.resource1_id = Some(resource1_id);
        }
        if let Some(resource2_id) = changes.resource2_id {
            next.resource2_id = Some(resource2_id);
        }
        if let Some(hours) = changes.r1_estimate_hrs {
            next.r1_estimate_hrs = validate_hours("r1_estimate_hrs", hours)?;
        }
        if let Some(hours) = changes.r1_actual_hrs {
            next.r1_actual_hrs = validate_hours("r1_actual_hrs", hours)?;
        }
        if let Some(hours) = changes.r2_estimate_hrs {
            next.r2_estimate_hrs = validate_hours("r2_estimate_hrs", hours)?;
        }
        if let Some(hours) = changes.r2_actual_hrs {
            next.r2_actual_hrs = validate_hours("r2_actual_hrs", hours)?;
        }
        if changes.estimate_days.is_some() {
            next.estimate_days = validate_estimate_days(changes.estimate_days)?;
        }
        if let Some(deadline) = changes.deadline {
            next.deadline = Some(deadline);
        }
        if let Some(date) = changes.expected_start_date {
            next.expected_start_date = Some(date);
        }
        if let Some(date) = changes.actual_start_date {
            next.actual_start_date = Some(date);
        }
        if let Some(date) = changes.completed_date {
            next.completed_date = Some(date);
        }
        if let Some(tags) = changes.tags {
            next.tags = normalize_tags(tags);
        }

        if next.status != self.status {
            self.check_transition(&next)?;
            if next.status == TaskStatus::InProgress && next.actual_start_date.is_none() {
                next.actual_start_date = Some(today);
            }
        }

        next.updated_at = now;
        *self = next;
        Ok(())
    }

    fn check_transition(&self, next: &Self) -> AppResult<()> {
        if !self.status.can_transition_to(next.status) {
            let allowed = self
                .status
                .allowed_transitions()
                .iter()
                .map(TaskStatus::as_str)
                .collect::<Vec<_>>();
            let allowed = if allowed.is_empty() {
                "none".to_owned()
            } else {
                allowed.join(", ")
            };

            return Err(AppError::InvalidTransition(format!(
                "cannot change status from '{}' to '{}'; allowed: {allowed}",
                self.status, next.status
            )));
        }

        if next.status == TaskStatus::Done {
            if next.completed_date.is_none() {
                return Err(AppError::InvalidTransition(
                    "completed_date is required to mark a task Done".to_owned(),
                ));
            }
            if next.total_actual_hrs() <= 0.0 {
                return Err(AppError::InvalidTransition(
                    "actual hours must be greater than zero to mark a task Done".to_owned(),
                ));
            }
        }

        Ok(())
    }

    /// Soft-deletes the task and moves it to Cancelled.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_deleted() {
            return Err(AppError::Validation(format!(
                "task '{}' is already deleted",
                self.task_code.as_str()
            )));
        }

        self.status = TaskStatus::Cancelled;
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Sum of both assignee estimates.
    #[must_use]
    pub fn total_estimate_hrs(&self) -> f64 {
        self.r1_estimate_hrs + self.r2_estimate_hrs
    }

    /// Sum of both assignee actuals.
    #[must_use]
    pub fn total_actual_hrs(&self) -> f64 {
        self.r1_actual_hrs + self.r2_actual_hrs
    }

    /// Actual minus estimate; positive means over budget.
    #[must_use]
    pub fn hours_variance(&self) -> f64 {
        self.total_actual_hrs() - self.total_estimate_hrs()
    }

    /// Whether an open task is past its deadline.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.deadline.is_some_and(|deadline| deadline < today)
    }

    /// Returns whether `resource_id` is either assignee.
    #[must_use]
    pub fn is_assigned_to(&self, resource_id: Uuid) -> bool {
        self.resource1_id == Some(resource_id) || self.resource2_id == Some(resource_id)
    }

    /// Estimated hours this task puts on `resource_id`, if assigned.
    #[must_use]
    pub fn estimate_hours_for(&self, resource_id: Uuid) -> Option<f64> {
        if !self.is_assigned_to(resource_id) {
            return None;
        }

        let mut hours = 0.0;
        if self.resource1_id == Some(resource_id) {
            hours += self.r1_estimate_hrs;
        }
        if self.resource2_id == Some(resource_id) {
            hours += self.r2_estimate_hrs;
        }

        Some(hours)
    }

    /// Assigned resources, primary first.
    #[must_use]
    pub fn assignees(&self) -> Vec<Uuid> {
        let mut assignees = Vec::with_capacity(2);
        assignees.extend(self.resource1_id);
        if let Some(resource2_id) = self.resource2_id {
            if !assignees.contains(&resource2_id) {
                assignees.push(resource2_id);
            }
        }

        assignees
    }
}
