use std::fmt;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde_json::Value;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use crate::config::AppConfig;

/// HTTP verbs used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        })
    }
}

/// A request relative to the API base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Verb.
    pub method: Method,
    /// Path below the versioned base, starting with `/`.
    pub path: String,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
    /// JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Request without body or token.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a bearer token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Raw response: status code and parsed JSON body (`Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body.
    pub body: Value,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends [`ApiRequest`]s somewhere and returns the raw response.
///
/// Only transport failures are errors here; HTTP error statuses come back as
/// ordinary responses and are classified by the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request. No retries.
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: String,
}

impl HttpTransport {
    /// Build a transport for the configured base URL and timeout.
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ApiError::network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base: config.api_base(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = self.url(&request.path);
        debug!(method = %request.method, url = %url, "Dispatching request");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &url);
        if let Some(token) = request.bearer.as_deref() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::network(format!("{} {url}: {err}", request.method)))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::network(format!("failed to read body from {url}: {err}")))?;

        // Error pages are often HTML; keep the status and drop the body.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let config = AppConfig {
            api_url: "http://localhost:5000/".to_string(),
            ..AppConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/auth/login"),
            "http://localhost:5000/api/v1/auth/login"
        );
    }
}
