mod audit;
mod common;
mod dashboard;
mod governance;
mod projects;
mod reports;
mod resources;
mod tasks;

pub use audit::{AuditEntryResponse, AuditLogQueryRequest};
pub use common::{DataEnvelope, ListEnvelope, MessageEnvelope};
pub use dashboard::{DashboardMetricsResponse, HealthResponse};
pub use governance::{
    ApprovalResponse, EvaluateGateRequest, GateEvaluationResponse, QualityGateResponse,
    ReadinessQuery, RecordTestRunRequest, SaveQualityGateRequest, SubmitApprovalRequest,
    SubmitApprovalResponse, TestRunResponse,
};
pub use projects::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};
pub use reports::{
    ClaimReportJobsRequest, ClaimedReportJobsResponse, CreateReportRequest, Pagination,
    ReportCallbackRequest, ReportJobResponse, ReportListEnvelope, ReportListQuery,
    ReportStatusEnvelope, SubmittedReportResponse,
};
pub use resources::{CreateResourceRequest, ResourceResponse, UpdateResourceRequest};
pub use tasks::{
    CreateTaskRequest, TaskListQuery, TaskMutationResponse, TaskResponse, UpdateTaskRequest,
};
