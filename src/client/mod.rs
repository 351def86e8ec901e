//! HTTP client for the project-graph API.
//!
//! Configuration is via environment variables:
//! - `PROJECT_GRAPH_URL` - Base URL (default: `http://localhost:4000/api`)
//! - `PROJECT_GRAPH_TIMEOUT_SECS` - Transport deadline in seconds (optional)
//!
//! Requests are never retried here. A timeout, when configured, is the
//! transport's own deadline.

mod request;

pub use request::{ApiRequest, ApiResponse, HttpMethod};

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DecodeError, Error, Result};

/// Default URL for local development.
const DEFAULT_URL: &str = "http://localhost:4000/api";

/// Query parameter carrying the user key.
const USER_KEY_PARAM: &str = "email";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("PROJECT_GRAPH_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let timeout = std::env::var("PROJECT_GRAPH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);
        Self { base_url, timeout }
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// HTTP client for the project-graph API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    client: Client,
}

impl ApiClient {
    /// Create with explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = http_client(&config)?;
        Ok(Self { config, client })
    }

    /// Create client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Assemble a request for `user_key` against `/{segment}/{segment}...`.
    ///
    /// `T` is the type the response body will be decoded into.
    pub fn build_request<T>(
        &self,
        user_key: &str,
        method: HttpMethod,
        path_segments: &[&str],
        body: Option<Value>,
    ) -> Result<ApiRequest<T>> {
        let user_key = user_key.trim();
        if user_key.is_empty() {
            return Err(Error::InvalidRequest("user key must not be empty".to_string()));
        }
        if path_segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::InvalidRequest(format!(
                "empty path segment in {:?}",
                path_segments
            )));
        }

        let path = format!("/{}", path_segments.join("/"));
        Ok(ApiRequest::new(
            method,
            path,
            vec![(USER_KEY_PARAM.to_string(), user_key.to_string())],
            body,
        ))
    }

    /// Execute a request and decode its body into `T`.
    ///
    /// Fails with [`Error::Transport`] on I/O failure, [`Error::Api`] on a
    /// status outside 200-299 and [`Error::Decode`] when the body does not
    /// parse as `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest<T>,
    ) -> Result<ApiResponse<T>> {
        execute_with(&self.client, &self.config.base_url, request).await
    }

    /// Blocking form of [`ApiClient::execute`].
    ///
    /// Drives the request on a private current-thread runtime, so it must not
    /// be called from inside an async context.
    pub fn execute_blocking<T: DeserializeOwned>(
        &self,
        request: &ApiRequest<T>,
    ) -> Result<ApiResponse<T>> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::InvalidRequest(
                "execute_blocking called from inside an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to start blocking runtime: {}", e)))?;

        // Pooled connections are bound to the runtime that opened them.
        let client = http_client(&self.config)?;
        runtime.block_on(execute_with(&client, &self.config.base_url, request))
    }
}

fn http_client(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

async fn execute_with<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    request: &ApiRequest<T>,
) -> Result<ApiResponse<T>> {
    let url = format!("{}{}", base_url, request.path());
    tracing::debug!(method = request.method().as_str(), path = request.path(), "Dispatching request");

    let mut builder = client
        .request(request.method().into(), &url)
        .query(request.query());
    if let Some(body) = request.body() {
        builder = builder.json(body);
    }
    let response = builder.send().await?;
    handle_response(request.path(), response).await
}

/// Handle response, converting HTTP errors to [`Error`].
async fn handle_response<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<ApiResponse<T>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            format!("API request failed with status: {}", status.as_u16())
        } else {
            body
        };
        tracing::debug!(status = status.as_u16(), path, "Request failed");
        return Err(Error::Api {
            status_code: status.as_u16(),
            path: path.to_string(),
            message,
        });
    }

    let bytes = response.bytes().await?;
    let body = serde_json::from_slice(&bytes)
        .map_err(|e| DecodeError::new(format!("response body of {}", path), e.to_string()))?;
    Ok(ApiResponse {
        status: status.as_u16(),
        body,
    })
}
