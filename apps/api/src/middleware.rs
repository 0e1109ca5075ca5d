use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use gerbil_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the calling worker's id on internal routes.
pub const WORKER_ID_HEADER: &str = "x-gerbil-worker-id";

/// Authenticated worker attached to internal requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerIdentity(String);

impl WorkerIdentity {
    /// Returns the worker id sent by the caller.
    #[must_use]
    pub fn worker_id(&self) -> &str {
        self.0.as_str()
    }
}

/// Guards internal worker routes with the shared bearer secret.
///
/// The routes are hidden entirely when no secret is configured.
pub async fn require_worker_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(secret) = state.worker_shared_secret.as_deref() else {
        return Err(AppError::NotFound("worker endpoints are disabled".to_owned()).into());
    };

    let headers = request.headers();
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    if presented != Some(secret) {
        return Err(AppError::Unauthorized("invalid worker credentials".to_owned()).into());
    }

    let worker_id = headers
        .get(WORKER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{WORKER_ID_HEADER} header is required")))?
        .to_owned();

    request.extensions_mut().insert(WorkerIdentity(worker_id));
    Ok(next.run(request).await)
}
