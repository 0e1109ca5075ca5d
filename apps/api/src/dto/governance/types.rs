use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::dto::common::{optional_f64, optional_i64};

/// Incoming payload for a quality gate upsert.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-quality-gate-request.ts"
)]
pub struct SaveQualityGateRequest {
    pub project_id: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id_alias: Option<String>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub min_pass_rate: Option<f64>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub max_critical_defects: Option<i64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub min_test_coverage: Option<f64>,
}

/// API representation of a project's quality gate.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/quality-gate-response.ts"
)]
pub struct QualityGateResponse {
    pub project_id: String,
    pub min_pass_rate: f64,
    pub max_critical_defects: u32,
    pub min_test_coverage: f64,
    pub is_default: bool,
    pub updated_at: Option<String>,
}

/// Metrics to check a gate against. An empty body uses the latest test run.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/evaluate-gate-request.ts"
)]
pub struct EvaluateGateRequest {
    #[serde(default, alias = "pass_rate", deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub pass_rate_pct: Option<f64>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub critical_defects: Option<i64>,
    #[serde(default, alias = "test_coverage", deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub test_coverage_pct: Option<f64>,
}

/// Outcome of one gate criterion.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gate-criterion-response.ts"
)]
pub struct GateCriterionResponse {
    pub criterion: String,
    pub threshold: f64,
    pub actual: Option<f64>,
    pub passed: bool,
}

/// Gate verdict with per-criterion results.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gate-evaluation-response.ts"
)]
pub struct GateEvaluationResponse {
    pub project_id: String,
    pub passed: bool,
    pub criteria: Vec<GateCriterionResponse>,
    pub blocking_issues: Vec<String>,
    pub evaluated_at: String,
}

/// Incoming payload for a test run summary.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/record-test-run-request.ts"
)]
pub struct RecordTestRunRequest {
    pub project_id: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id_alias: Option<String>,
    #[serde(alias = "executed_on")]
    pub executed_at: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub total_tests: Option<i64>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub passed: Option<i64>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub failed: Option<i64>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub not_run: Option<i64>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub critical_defects: Option<i64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub test_coverage_pct: Option<f64>,
}

/// API representation of a test run summary.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/test-run-response.ts"
)]
pub struct TestRunResponse {
    pub id: String,
    pub project_id: String,
    pub executed_at: String,
    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub not_run: u32,
    pub critical_defects: u32,
    pub test_coverage_pct: Option<f64>,
    pub pass_rate_pct: f64,
    pub created_at: String,
}

/// Incoming release decision.
///
/// `projectId`, `approvalStatus` and `comments` are accepted as aliases of
/// `project_id`, `status` and `comment`.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-approval-request.ts"
)]
pub struct SubmitApprovalRequest {
    pub project_id: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id_alias: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "approvalStatus")]
    pub approval_status: Option<String>,
    pub comment: Option<String>,
    pub comments: Option<String>,
    #[serde(alias = "releaseVersion")]
    pub release_version: Option<String>,
    #[serde(alias = "approverName")]
    pub approver_name: Option<String>,
    #[serde(alias = "gateSnapshot")]
    #[ts(type = "unknown")]
    pub gate_snapshot: Option<Value>,
}

/// API representation of a recorded release decision.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/approval-response.ts"
)]
pub struct ApprovalResponse {
    pub id: String,
    pub project_id: String,
    pub release_version: Option<String>,
    pub status: String,
    pub comment: String,
    pub comments: String,
    pub approver_name: Option<String>,
    #[ts(type = "unknown")]
    pub gate_snapshot: Option<Value>,
    pub created_at: String,
}

/// Envelope returned after an approval is recorded.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-approval-response.ts"
)]
pub struct SubmitApprovalResponse {
    pub success: bool,
    #[serde(rename = "approvalId")]
    pub approval_id: String,
    pub status: String,
    pub data: ApprovalResponse,
}

/// Release readiness filter.
#[derive(Debug, Default, Deserialize)]
pub struct ReadinessQuery {
    pub status: Option<String>,
}
