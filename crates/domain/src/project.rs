use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use gerbil_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::normalize_optional_text;
use crate::{Priority, Task, TaskStatus};

/// Maximum project name length.
pub const PROJECT_NAME_MAX_CHARS: usize = 100;

/// Inclusive bounds of the project weighting scale.
pub const TOTAL_WEIGHT_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work is ongoing.
    #[default]
    Active,
    /// Temporarily paused.
    OnHold,
    /// Delivered.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl ProjectStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "status must be one of active, on_hold, completed, cancelled, got '{value}'"
            ))),
        }
    }
}

/// Relative weight of a project inside the portfolio, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TotalWeight(u8);

impl TotalWeight {
    /// Creates a validated weight.
    pub fn new(value: i64) -> AppResult<Self> {
        if !TOTAL_WEIGHT_RANGE.contains(&value) {
            return Err(AppError::Validation(format!(
                "total_weight must be between {} and {}, got {value}",
                TOTAL_WEIGHT_RANGE.start(),
                TOTAL_WEIGHT_RANGE.end()
            )));
        }

        u8::try_from(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid total_weight: {error}")))
    }

    /// Returns the numeric weight.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for TotalWeight {
    fn default() -> Self {
        Self(1)
    }
}

/// A tracked delivery project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Storage identifier.
    pub id: Uuid,
    /// Human-facing project code, exposed as `project_id`.
    #[serde(rename = "project_id")]
    pub project_code: NonEmptyString,
    /// Display name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Delivery priority.
    pub priority: Priority,
    /// Portfolio weight.
    pub total_weight: TotalWeight,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Planned start.
    pub start_date: Option<NaiveDate>,
    /// Planned delivery.
    pub target_date: Option<NaiveDate>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input payload for creating a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInput {
    /// Project code.
    pub project_code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional priority, defaults to Medium.
    pub priority: Option<Priority>,
    /// Optional weight, defaults to 1.
    pub total_weight: Option<i64>,
    /// Optional status, defaults to active.
    pub status: Option<ProjectStatus>,
    /// Planned start.
    pub start_date: Option<NaiveDate>,
    /// Planned delivery.
    pub target_date: Option<NaiveDate>,
}

/// Partial update for a project. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New weight.
    pub total_weight: Option<i64>,
    /// New status.
    pub status: Option<ProjectStatus>,
    /// New planned start.
    pub start_date: Option<NaiveDate>,
    /// New planned delivery.
    pub target_date: Option<NaiveDate>,
}

impl ProjectChanges {
    /// Returns whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Project {
    /// Creates a validated project.
    pub fn new(input: ProjectInput, now: DateTime<Utc>) -> AppResult<Self> {
        let ProjectInput {
            project_code,
            name,
            description,
            priority,
            total_weight,
            status,
            start_date,
            target_date,
        } = input;

        let project_code = NonEmptyString::bounded(project_code, "project_id", 50)?;
        let name = NonEmptyString::bounded(name, "name", PROJECT_NAME_MAX_CHARS)?;
        let total_weight = total_weight
            .map(TotalWeight::new)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            id: Uuid::new_v4(),
            project_code,
            name,
            description: normalize_optional_text("description", description, 2_000)?,
            priority: priority.unwrap_or_default(),
            total_weight,
            status: status.unwrap_or_default(),
            start_date,
            target_date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Returns whether the project has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies a patch. The project is left untouched when any field is invalid.
    pub fn apply(&mut self, changes: ProjectChanges, now: DateTime<Utc>) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_owned()));
        }

        let mut next = self.clone();

        if let Some(name) = changes.name {
            next.name = NonEmptyString::bounded(name, "name", PROJECT_NAME_MAX_CHARS)?;
        }
        if let Some(description) = changes.description {
            next.description = normalize_optional_text("description", Some(description), 2_000)?;
        }
        if let Some(priority) = changes.priority {
            next.priority = priority;
        }
        if let Some(total_weight) = changes.total_weight {
            next.total_weight = TotalWeight::new(total_weight)?;
        }
        if let Some(status) = changes.status {
            next.status = status;
        }
        if let Some(start_date) = changes.start_date {
            next.start_date = Some(start_date);
        }
        if let Some(target_date) = changes.target_date {
            next.target_date = Some(target_date);
        }

        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Marks the project deleted.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_deleted() {
            return Err(AppError::Validation(format!(
                "project '{}' is already deleted",
                self.project_code.as_str()
            )));
        }

        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

/// Task completion rollup for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectProgress {
    /// Live tasks in the project.
    pub total_tasks: u64,
    /// Tasks in Done.
    pub tasks_done: u64,
    /// Done share of non-cancelled tasks, in percent.
    pub completion_pct: f64,
}

impl ProjectProgress {
    /// Computes progress from a project's live tasks.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut total_tasks = 0_u64;
        let mut tasks_done = 0_u64;
        let mut tasks_cancelled = 0_u64;

        for task in tasks.into_iter().filter(|task| !task.is_deleted()) {
            total_tasks += 1;
            match task.status {
                TaskStatus::Done => tasks_done += 1,
                TaskStatus::Cancelled => tasks_cancelled += 1,
                TaskStatus::Backlog | TaskStatus::InProgress => {}
            }
        }

        let denominator = total_tasks.saturating_sub(tasks_cancelled);
        Self {
            total_tasks,
            tasks_done,
            completion_pct: percentage(tasks_done as f64, denominator as f64),
        }
    }
}

/// Returns `part / whole` as a percentage rounded to two decimals, or 0 for an empty whole.
#[must_use]
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }

    ((part / whole) * 10_000.0).round() / 100.0
}
