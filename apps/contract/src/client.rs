use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HOST, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::error::{ContractError, ContractResult};
use crate::options::SuiteOptions;

/// Header naming the caller on audited writes.
pub const ACTOR_HEADER: &str = "x-user-email";

/// Caller identity the suite writes with.
pub const SUITE_ACTOR: &str = "contract-suite@gerbil.qc";

/// HTTP client bound to one deployment of the API.
#[derive(Debug, Clone)]
pub struct ContractClient {
    http: reqwest::Client,
    base_url: String,
    api_prefix: String,
}

/// Captured response of one request.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// Request path, for messages.
    pub path: String,
    /// HTTP status code.
    pub status: u16,
    /// `content-type` header, when present.
    pub content_type: Option<String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ContractClient {
    /// Builds a client from suite options.
    pub fn new(options: &SuiteOptions) -> ContractResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACTOR_HEADER, HeaderValue::from_static(SUITE_ACTOR));
        if let Some(host) = options.host_header.as_deref() {
            let host = HeaderValue::from_str(host)
                .map_err(|error| ContractError::Setup(format!("invalid host header: {error}")))?;
            default_headers.insert(HOST, host);
        }

        let http = reqwest::Client::builder()
            .timeout(options.request_timeout())
            .default_headers(default_headers)
            .build()
            .map_err(|error| ContractError::Setup(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_owned(),
            api_prefix: normalize_prefix(options.api_prefix.as_str()),
        })
    }

    /// Path of a resource route under the configured prefix.
    #[must_use]
    pub fn api_path(&self, path: &str) -> String {
        format!("{}{path}", self.api_prefix)
    }

    /// Sends a request to a path on the API origin.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ContractResult<ProbeResponse> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method.clone(), url.as_str());
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let transport = |error: reqwest::Error| ContractError::Transport {
            method: method.to_string(),
            url: url.clone(),
            message: error.to_string(),
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.bytes().await.map_err(transport)?.to_vec();
        debug!(method = %method, path, status, "contract request");

        Ok(ProbeResponse {
            path: path.to_owned(),
            status,
            content_type,
            body,
        })
    }

    /// GET under the API prefix.
    pub async fn get(&self, path: &str) -> ContractResult<ProbeResponse> {
        self.send(Method::GET, self.api_path(path).as_str(), None).await
    }

    /// POST under the API prefix.
    pub async fn post(&self, path: &str, body: &Value) -> ContractResult<ProbeResponse> {
        self.send(Method::POST, self.api_path(path).as_str(), Some(body))
            .await
    }

    /// PATCH under the API prefix.
    pub async fn patch(&self, path: &str, body: &Value) -> ContractResult<ProbeResponse> {
        self.send(Method::PATCH, self.api_path(path).as_str(), Some(body))
            .await
    }

    /// DELETE under the API prefix.
    pub async fn delete(&self, path: &str) -> ContractResult<ProbeResponse> {
        self.send(Method::DELETE, self.api_path(path).as_str(), None)
            .await
    }

    /// GET of an absolute URL on another origin, such as the frontend.
    pub async fn get_absolute(&self, url: &str) -> ContractResult<ProbeResponse> {
        let transport = |error: reqwest::Error| ContractError::Transport {
            method: Method::GET.to_string(),
            url: url.to_owned(),
            message: error.to_string(),
        };

        let response = self
            .http
            .get(url)
            .header(HOST, host_of(url))
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(ProbeResponse {
            path: url.to_owned(),
            status,
            content_type,
            body,
        })
    }
}

impl ProbeResponse {
    /// Fails unless the status is one of `expected`.
    pub fn expect_status(&self, expected: &[u16]) -> ContractResult<&Self> {
        if expected.contains(&self.status) {
            return Ok(self);
        }

        Err(ContractError::Assertion(format!(
            "{} returned {}, expected one of {expected:?}: {}",
            self.path,
            self.status,
            self.text_excerpt()
        )))
    }

    /// Decodes the body as JSON.
    pub fn json(&self) -> ContractResult<Value> {
        serde_json::from_slice(&self.body).map_err(|error| ContractError::Decode {
            path: self.path.clone(),
            message: error.to_string(),
        })
    }

    /// Body as lossy UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn text_excerpt(&self) -> String {
        self.text().chars().take(300).collect()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

// Overrides the API host header default for requests to other origins.
fn host_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_owned()
}
