use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gerbil_core::AppError;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    /// Error category.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
    /// Per-field messages, present on validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub details: Option<Vec<String>>,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Returns the status code and category of the wrapped error.
    #[must_use]
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            AppError::InvalidTransition(_) => (StatusCode::BAD_REQUEST, "Invalid status transition"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category) = self.classify();
        if let AppError::Internal(message) = &self.0 {
            error!(error = %message, "request failed with internal error");
        }

        let message = self.0.detail().to_owned();
        let details = matches!(self.0, AppError::Validation(_)).then(|| vec![message.clone()]);
        let payload = Json(ErrorResponse {
            error: category.to_owned(),
            message,
            details,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
