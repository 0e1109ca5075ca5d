use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use gerbil_core::AppError;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::extract::ACTOR_HEADER;

/// CORS for the web frontends; `frontend_urls` is a comma-separated origin list.
pub(super) fn build_cors_layer(frontend_urls: &str) -> Result<CorsLayer, AppError> {
    let origins = parse_origins(frontend_urls)?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ACTOR_HEADER)])
        .expose_headers([CONTENT_DISPOSITION]))
}

fn parse_origins(frontend_urls: &str) -> Result<Vec<HeaderValue>, AppError> {
    let origins = frontend_urls
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|error| {
                AppError::Internal(format!("invalid FRONTEND_URL origin '{origin}': {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(AppError::Internal(
            "FRONTEND_URL must name at least one origin".to_owned(),
        ));
    }

    Ok(origins)
}
