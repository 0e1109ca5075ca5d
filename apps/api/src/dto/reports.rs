mod conversions;
mod types;

pub use types::{
    ClaimReportJobsRequest, ClaimedReportJobsResponse, CreateReportRequest, Pagination,
    ReportCallbackRequest, ReportJobResponse, ReportListEnvelope, ReportListQuery,
    ReportStatusEnvelope, SubmittedReportResponse,
};
