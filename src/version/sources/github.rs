//! GitHub contents API source implementation

use reqwest::Url;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{GITHUB_RAW_ACCEPT, TrackerConfig, USER_AGENT};
use crate::version::error::TrackerError;
use crate::version::source::ContentSource;

/// Error body returned by the GitHub API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Content source backed by `GET /repos/{repository}/contents/{path}?ref={branch}`
pub struct GitHubContentSource {
    client: reqwest::Client,
    base_url: Url,
    authenticated: bool,
    timeout_ms: u64,
}

impl GitHubContentSource {
    /// Creates a source using the base URL, token and timeout from `config`
    pub fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(GITHUB_RAW_ACCEPT));

        if let Some(token) = config.auth_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                TrackerError::InvalidConfiguration {
                    field: "authToken",
                    reason: "token contains characters not allowed in a header".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let base_url = Url::parse(config.api_base_url())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| TrackerError::InvalidConfiguration {
                field: "apiBaseUrl",
                reason: format!("{:?} is not an absolute URL", config.api_base_url()),
            })?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| TrackerError::InvalidConfiguration {
                field: "client",
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            authenticated: config.auth_token().is_some(),
            timeout_ms: config.timeout_ms(),
        })
    }

    /// Builds the contents URL, percent-encoding each path segment and the ref
    fn content_url(&self, repository: &str, branch: &str, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("repos")
                .extend(repository.split('/'))
                .push("contents")
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.query_pairs_mut().append_pair("ref", branch);
        url
    }

    fn transport_error(&self, repository: &str, error: reqwest::Error) -> TrackerError {
        if error.is_timeout() {
            TrackerError::RequestTimeout {
                repository: repository.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            TrackerError::Network {
                repository: repository.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait::async_trait]
impl ContentSource for GitHubContentSource {
    async fn fetch_content(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<String, TrackerError> {
        let url = self.content_url(repository, branch, path);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(repository, e))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound {
                repository: repository.to_string(),
                branch: branch.to_string(),
                path: path.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TrackerError::Unauthorized {
                repository: repository.to_string(),
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(TrackerError::RateLimitExceeded {
                repository: repository.to_string(),
                authenticated: self.authenticated,
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .or_else(|| status.canonical_reason().map(str::to_string));
            return Err(TrackerError::RemoteError {
                repository: repository.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(repository, e))
    }
}
