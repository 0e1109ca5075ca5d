mod conversions;
mod types;

pub use types::{
    ApprovalResponse, EvaluateGateRequest, GateEvaluationResponse, QualityGateResponse,
    ReadinessQuery, RecordTestRunRequest, SaveQualityGateRequest, SubmitApprovalRequest,
    SubmitApprovalResponse, TestRunResponse,
};
