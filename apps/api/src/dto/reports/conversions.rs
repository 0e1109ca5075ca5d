use gerbil_application::{ReportCallback, ReportJobPage, ReportJobQuery};
use gerbil_core::AppError;
use gerbil_domain::{ReportJob, ReportRequest};

use super::types::{
    CreateReportRequest, Pagination, ReportCallbackRequest, ReportJobResponse, ReportListEnvelope,
    ReportListQuery, ReportStatusEnvelope, SubmittedReportResponse,
};
use crate::dto::common::{format_timestamp, parse_optional, parse_uuid_field};

impl TryFrom<CreateReportRequest> for ReportRequest {
    type Error = AppError;

    fn try_from(value: CreateReportRequest) -> Result<Self, Self::Error> {
        let report_type = parse_optional(value.report_type)?
            .ok_or_else(|| AppError::Validation("report_type is required".to_owned()))?;

        Ok(Self {
            report_type,
            format: parse_optional(value.format)?,
            filters: value.filters,
            user_email: value.user_email.filter(|email| !email.trim().is_empty()),
        })
    }
}

impl From<ReportJob> for ReportJobResponse {
    fn from(value: ReportJob) -> Self {
        Self {
            job_id: value.job_id.to_string(),
            report_type: value.report_type.as_str().to_owned(),
            format: value.format.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            filters: value.filters,
            user_email: value.user_email,
            download_url: value.download_url,
            filename: value.filename,
            file_size: value.file_size,
            error_message: value.error_message,
            created_at: format_timestamp(value.created_at),
            completed_at: value.completed_at.map(format_timestamp),
        }
    }
}

impl From<&ReportJob> for SubmittedReportResponse {
    fn from(value: &ReportJob) -> Self {
        Self {
            job_id: value.job_id.to_string(),
            status: value.status.as_str().to_owned(),
            report_type: value.report_type.as_str().to_owned(),
            format: value.format.as_str().to_owned(),
            status_url: format!("/api/reports/{}", value.job_id),
        }
    }
}

impl From<ReportJob> for ReportStatusEnvelope {
    fn from(value: ReportJob) -> Self {
        let data = ReportJobResponse::from(value);
        Self {
            success: true,
            status: data.status.clone(),
            data,
        }
    }
}

fn non_negative(field: &str, value: Option<i64>) -> Result<Option<usize>, AppError> {
    value
        .map(|value| {
            usize::try_from(value).map_err(|_| {
                AppError::Validation(format!("{field} must be a non-negative integer, got {value}"))
            })
        })
        .transpose()
}

impl TryFrom<ReportListQuery> for ReportJobQuery {
    type Error = AppError;

    fn try_from(value: ReportListQuery) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        Ok(Self {
            user_email: value.user_email.filter(|email| !email.trim().is_empty()),
            status: parse_optional(value.status)?,
            limit: non_negative("limit", value.limit)?.unwrap_or(defaults.limit),
            offset: non_negative("offset", value.offset)?.unwrap_or(defaults.offset),
        })
    }
}

impl ReportListEnvelope {
    /// Wraps one page with the paging it was read with.
    pub fn from_page(page: ReportJobPage, limit: usize, offset: usize) -> Self {
        Self {
            success: true,
            data: page.jobs.into_iter().map(ReportJobResponse::from).collect(),
            pagination: Pagination {
                total: page.total,
                limit,
                offset,
            },
        }
    }
}

impl TryFrom<ReportCallbackRequest> for ReportCallback {
    type Error = AppError;

    fn try_from(value: ReportCallbackRequest) -> Result<Self, Self::Error> {
        let status = parse_optional(value.status)?
            .ok_or_else(|| AppError::Validation("status is required".to_owned()))?;

        Ok(Self {
            job_id: parse_uuid_field("job_id", value.job_id)?,
            status,
            download_url: value.download_url,
            filename: value.filename,
            file_size: value
                .file_size
                .map(|size| {
                    u64::try_from(size).map_err(|_| {
                        AppError::Validation(format!(
                            "file_size must be a non-negative integer, got {size}"
                        ))
                    })
                })
                .transpose()?,
            error_message: value.error_message,
        })
    }
}
