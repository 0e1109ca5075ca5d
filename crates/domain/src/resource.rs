use chrono::{DateTime, Utc};
use gerbil_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::normalize_optional_text;
use crate::project::percentage;
use crate::{EmailAddress, Task};

/// Upper bound on weekly capacity, in hours.
pub const MAX_WEEKLY_CAPACITY_HRS: i64 = 80;

/// Capacity assigned when a resource is created without one.
pub const DEFAULT_WEEKLY_CAPACITY_HRS: u16 = 40;

/// Weekly capacity of a resource, 1 through 80 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklyCapacity(u16);

impl WeeklyCapacity {
    /// Creates a validated capacity.
    pub fn new(hours: i64) -> AppResult<Self> {
        if !(1..=MAX_WEEKLY_CAPACITY_HRS).contains(&hours) {
            return Err(AppError::Validation(format!(
                "weekly_capacity_hrs must be between 1 and {MAX_WEEKLY_CAPACITY_HRS}, got {hours}"
            )));
        }

        u16::try_from(hours)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid weekly_capacity_hrs: {error}")))
    }

    /// Returns the capacity in hours.
    #[must_use]
    pub fn hours(&self) -> u16 {
        self.0
    }
}

impl Default for WeeklyCapacity {
    fn default() -> Self {
        Self(DEFAULT_WEEKLY_CAPACITY_HRS)
    }
}

/// A person that tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Storage identifier.
    pub id: Uuid,
    /// Display name.
    pub resource_name: NonEmptyString,
    /// Job role.
    pub role: Option<String>,
    /// Owning department.
    pub department: Option<String>,
    /// Contact email.
    pub email: Option<EmailAddress>,
    /// Weekly capacity.
    pub weekly_capacity_hrs: WeeklyCapacity,
    /// Whether the resource can take new work.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input payload for creating a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceInput {
    /// Display name.
    pub resource_name: String,
    /// Job role.
    pub role: Option<String>,
    /// Owning department.
    pub department: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Weekly capacity, defaults to 40.
    pub weekly_capacity_hrs: Option<i64>,
    /// Active flag, defaults to true.
    pub is_active: Option<bool>,
}

/// Partial update for a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceChanges {
    /// New display name.
    pub resource_name: Option<String>,
    /// New role.
    pub role: Option<String>,
    /// New department.
    pub department: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New capacity.
    pub weekly_capacity_hrs: Option<i64>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl ResourceChanges {
    /// Returns whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_email(value: Option<String>) -> AppResult<Option<EmailAddress>> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(EmailAddress::new)
        .transpose()
}

impl Resource {
    /// Creates a validated resource.
    pub fn new(input: ResourceInput, now: DateTime<Utc>) -> AppResult<Self> {
        let weekly_capacity_hrs = input
            .weekly_capacity_hrs
            .map(WeeklyCapacity::new)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            id: Uuid::new_v4(),
            resource_name: NonEmptyString::bounded(input.resource_name, "resource_name", 100)?,
            role: normalize_optional_text("role", input.role, 100)?,
            department: normalize_optional_text("department", input.department, 100)?,
            email: parse_email(input.email)?,
            weekly_capacity_hrs,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Returns whether the resource has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies a patch. The resource is left untouched when any field is invalid.
    pub fn apply(&mut self, changes: ResourceChanges, now: DateTime<Utc>) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_owned()));
        }

        let mut next = self.clone();
        if let Some(resource_name) = changes.resource_name {
            next.resource_name = NonEmptyString::bounded(resource_name, "resource_name", 100)?;
        }
        if let Some(role) = changes.role {
            next.role = normalize_optional_text("role", Some(role), 100)?;
        }
        if let Some(department) = changes.department {
            next.department = normalize_optional_text("department", Some(department), 100)?;
        }
        if let Some(email) = changes.email {
            next.email = parse_email(Some(email))?;
        }
        if let Some(hours) = changes.weekly_capacity_hrs {
            next.weekly_capacity_hrs = WeeklyCapacity::new(hours)?;
        }
        if let Some(is_active) = changes.is_active {
            next.is_active = is_active;
        }

        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Marks the resource deleted and inactive.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_deleted() {
            return Err(AppError::Validation(format!(
                "resource '{}' is already deleted",
                self.resource_name.as_str()
            )));
        }

        self.deleted_at = Some(now);
        self.is_active = false;
        self.updated_at = now;
        Ok(())
    }
}

/// Workload of a resource derived from its open task assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    /// Estimated hours of open tasks assigned to the resource.
    pub current_allocation_hrs: f64,
    /// Open tasks assigned to the resource.
    pub active_task_count: u64,
    /// Allocation as a share of weekly capacity, in percent.
    pub utilization_pct: f64,
    /// Whether allocation exceeds weekly capacity.
    pub is_overallocated: bool,
}

impl ResourceAllocation {
    /// Computes allocation from tasks, counting only the hours assigned to this resource.
    #[must_use]
    pub fn compute<'a>(resource: &Resource, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut current_allocation_hrs = 0.0;
        let mut active_task_count = 0_u64;

        for task in tasks
            .into_iter()
            .filter(|task| !task.is_deleted() && task.status.is_open())
        {
            let hours = task.estimate_hours_for(resource.id);
            if let Some(hours) = hours {
                current_allocation_hrs += hours;
                active_task_count += 1;
            }
        }

        let capacity = f64::from(resource.weekly_capacity_hrs.hours());
        Self {
            current_allocation_hrs,
            active_task_count,
            utilization_pct: percentage(current_allocation_hrs, capacity),
            is_overallocated: current_allocation_hrs > capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Resource, ResourceChanges, ResourceInput, WeeklyCapacity};

    fn input() -> ResourceInput {
        ResourceInput {
            resource_name: "Dana Tester".to_owned(),
            ..ResourceInput::default()
        }
    }

    #[test]
    fn capacity_boundaries() {
        assert!(WeeklyCapacity::new(80).is_ok());
        assert!(WeeklyCapacity::new(81).is_err());
        assert!(WeeklyCapacity::new(100).is_err());
        assert!(WeeklyCapacity::new(0).is_err());
    }

    #[test]
    fn new_resource_defaults_to_active_forty_hours() {
        let resource = Resource::new(input(), Utc::now()).unwrap_or_else(|_| unreachable!());
        assert!(resource.is_active);
        assert_eq!(resource.weekly_capacity_hrs.hours(), 40);
    }

    #[test]
    fn patch_above_cap_is_rejected_and_state_kept() {
        let mut resource = Resource::new(input(), Utc::now()).unwrap_or_else(|_| unreachable!());
        let result = resource.apply(
            ResourceChanges {
                weekly_capacity_hrs: Some(100),
                ..ResourceChanges::default()
            },
            Utc::now(),
        );
        assert!(result.is_err());
        assert_eq!(resource.weekly_capacity_hrs.hours(), 40);
    }

    #[test]
    fn invalid_email_is_rejected() {
        let result = Resource::new(
            ResourceInput {
                email: Some("not-an-email".to_owned()),
                ..input()
            },
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn soft_delete_deactivates() {
        let mut resource = Resource::new(input(), Utc::now()).unwrap_or_else(|_| unreachable!());
        assert!(resource.soft_delete(Utc::now()).is_ok());
        assert!(!resource.is_active);
        assert!(resource.is_deleted());
    }
}
