use gerbil_core::AppError;
use gerbil_domain::{
    Approval, ApprovalInput, GateEvaluation, GateMetrics, QualityGate, QualityGateInput,
    TestRunInput, TestRunSummary,
};

use super::types::{
    ApprovalResponse, EvaluateGateRequest, GateCriterionResponse, GateEvaluationResponse,
    QualityGateResponse, RecordTestRunRequest, SaveQualityGateRequest, SubmitApprovalRequest,
    SubmitApprovalResponse, TestRunResponse,
};
use crate::dto::common::{
    first_present, format_timestamp, parse_optional, parse_optional_timestamp, parse_uuid_field,
};

impl TryFrom<SaveQualityGateRequest> for QualityGateInput {
    type Error = AppError;

    fn try_from(value: SaveQualityGateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: parse_uuid_field(
                "project_id",
                first_present([value.project_id, value.project_id_alias]),
            )?,
            min_pass_rate: value.min_pass_rate,
            max_critical_defects: value.max_critical_defects,
            min_test_coverage: value.min_test_coverage,
        })
    }
}

impl From<QualityGate> for QualityGateResponse {
    fn from(value: QualityGate) -> Self {
        Self {
            project_id: value.project_id.to_string(),
            min_pass_rate: value.min_pass_rate,
            max_critical_defects: value.max_critical_defects,
            min_test_coverage: value.min_test_coverage,
            is_default: value.is_default,
            updated_at: value.updated_at.map(format_timestamp),
        }
    }
}

impl EvaluateGateRequest {
    /// Returns explicit metrics, or `None` when the body named none.
    pub fn into_metrics(self) -> Result<Option<GateMetrics>, AppError> {
        if self.pass_rate_pct.is_none()
            && self.critical_defects.is_none()
            && self.test_coverage_pct.is_none()
        {
            return Ok(None);
        }

        let pass_rate = self.pass_rate_pct.ok_or_else(|| {
            AppError::Validation("pass_rate_pct is required when metrics are supplied".to_owned())
        })?;
        GateMetrics::new(
            pass_rate,
            self.critical_defects.unwrap_or_default(),
            self.test_coverage_pct,
        )
        .map(Some)
    }
}

impl From<GateEvaluation> for GateEvaluationResponse {
    fn from(value: GateEvaluation) -> Self {
        let blocking_issues = value.blocking_issues();
        Self {
            project_id: value.project_id.to_string(),
            passed: value.passed,
            criteria: value
                .criteria
                .into_iter()
                .map(|result| GateCriterionResponse {
                    criterion: result.criterion.as_str().to_owned(),
                    threshold: result.threshold,
                    actual: result.actual,
                    passed: result.passed,
                })
                .collect(),
            blocking_issues,
            evaluated_at: format_timestamp(value.evaluated_at),
        }
    }
}

impl TryFrom<RecordTestRunRequest> for TestRunInput {
    type Error = AppError;

    fn try_from(value: RecordTestRunRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: parse_uuid_field(
                "project_id",
                first_present([value.project_id, value.project_id_alias]),
            )?,
            executed_at: parse_optional_timestamp("executed_at", value.executed_at.as_deref())?,
            total_tests: value.total_tests,
            passed: value
                .passed
                .ok_or_else(|| AppError::Validation("passed is required".to_owned()))?,
            failed: value.failed.unwrap_or_default(),
            not_run: value.not_run,
            critical_defects: value.critical_defects,
            test_coverage_pct: value.test_coverage_pct,
        })
    }
}

impl From<TestRunSummary> for TestRunResponse {
    fn from(value: TestRunSummary) -> Self {
        Self {
            pass_rate_pct: value.pass_rate_pct(),
            id: value.id.to_string(),
            project_id: value.project_id.to_string(),
            executed_at: format_timestamp(value.executed_at),
            total_tests: value.total_tests,
            passed: value.passed,
            failed: value.failed,
            not_run: value.not_run,
            critical_defects: value.critical_defects,
            test_coverage_pct: value.test_coverage_pct,
            created_at: format_timestamp(value.created_at),
        }
    }
}

impl TryFrom<SubmitApprovalRequest> for ApprovalInput {
    type Error = AppError;

    fn try_from(value: SubmitApprovalRequest) -> Result<Self, Self::Error> {
        let project_id = parse_uuid_field(
            "project_id",
            first_present([value.project_id, value.project_id_alias]),
        )?;
        let status = parse_optional(first_present([value.status, value.approval_status]))?
            .ok_or_else(|| AppError::Validation("status is required".to_owned()))?;

        Ok(Self {
            project_id,
            release_version: value.release_version,
            status,
            comment: first_present([value.comment, value.comments]),
            approver_name: value.approver_name,
            gate_snapshot: value.gate_snapshot,
        })
    }
}

impl From<Approval> for ApprovalResponse {
    fn from(value: Approval) -> Self {
        let comment = String::from(value.comment);
        Self {
            id: value.id.to_string(),
            project_id: value.project_id.to_string(),
            release_version: value.release_version,
            status: value.status.as_str().to_owned(),
            comments: comment.clone(),
            comment,
            approver_name: value.approver_name,
            gate_snapshot: value.gate_snapshot,
            created_at: format_timestamp(value.created_at),
        }
    }
}

impl From<Approval> for SubmitApprovalResponse {
    fn from(value: Approval) -> Self {
        let data = ApprovalResponse::from(value);
        Self {
            success: true,
            approval_id: data.id.clone(),
            status: data.status.clone(),
            data,
        }
    }
}
