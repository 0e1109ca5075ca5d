//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod approval;
mod audit;
/// Date and free-text normalization shared by transport layers.
pub mod calendar;
mod dashboard;
mod email;
mod priority;
mod project;
mod quality_gate;
mod readiness;
mod report;
mod resource;
mod task;

pub use approval::{Approval, ApprovalDecision, ApprovalInput};
pub use audit::{AuditAction, AuditEntityType, changed_fields};
pub use dashboard::DashboardMetrics;
pub use email::EmailAddress;
pub use priority::Priority;
pub use project::{
    PROJECT_NAME_MAX_CHARS, Project, ProjectChanges, ProjectInput, ProjectProgress, ProjectStatus,
    TOTAL_WEIGHT_RANGE, TotalWeight, percentage,
};
pub use quality_gate::{
    DEFAULT_MAX_CRITICAL_DEFECTS, DEFAULT_MIN_PASS_RATE, DEFAULT_MIN_TEST_COVERAGE, GateCriterion,
    GateCriterionResult, GateEvaluation, GateMetrics, QualityGate, QualityGateInput, TestRunInput,
    TestRunSummary,
};
pub use readiness::{
    HealthStatus, ReadinessAssessment, ReadinessStatus, RiskFlag, RiskLevel, STALE_AFTER_DAYS,
    assess_readiness, detect_risk_flags,
};
pub use report::{ReportFormat, ReportJob, ReportOutcome, ReportRequest, ReportStatus, ReportType};
pub use resource::{
    DEFAULT_WEEKLY_CAPACITY_HRS, MAX_WEEKLY_CAPACITY_HRS, Resource, ResourceAllocation,
    ResourceChanges, ResourceInput, WeeklyCapacity,
};
pub use task::{TASK_NAME_MAX_CHARS, Task, TaskChanges, TaskCode, TaskInput, TaskStatus};
