//! Async REST transport for the loot backend.
//!
//! [`Backend`] is the seam the store, dispatcher and session calls talk to.
//! [`RestClient`] implements it over HTTP; [`crate::MemoryBackend`] implements
//! it in memory.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, Result};

/// Outcome of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 204, or a 2xx with an empty body.
    Empty,
    /// Any other 2xx, parsed.
    Json(Value),
}

impl ApiResponse {
    /// The parsed body, or `Value::Null` for an empty response.
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(v) => v,
        }
    }

    /// Turn a `{"error": "..."}` body into [`ClientError::Business`].
    pub fn check_business_error(self) -> Result<Self> {
        if let Self::Json(v) = &self {
            if let Some(message) = v.get("error").and_then(Value::as_str) {
                return Err(ClientError::Business(message.to_owned()));
            }
        }
        Ok(self)
    }
}

/// The collaborator surface every backend call goes through.
#[async_trait]
pub trait Backend: Send + Sync {
    /// GET `path` and return the parsed body.
    async fn get(&self, path: &str) -> Result<Value>;

    /// POST `body` as JSON to `path`.
    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse>;
}

/// HTTP implementation of [`Backend`].
///
/// The underlying `reqwest` client keeps a cookie jar, so a session cookie set
/// by `/login` is sent on every later request.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Reject garbage early; requests are built by string concatenation.
        Url::parse(base_url)?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(concat!("continuum-client/", env!("CARGO_PKG_VERSION")))
            .default_headers({
                let mut h = reqwest::header::HeaderMap::new();
                h.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                h
            })
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    pub fn from_config(api: &continuum_common::config::ApiConfig) -> Result<Self> {
        Self::new(&api.base_url, api.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method.clone(), &url);
        if let Some(b) = body {
            // Sets `Content-Type: application/json`.
            req = req.json(b);
        }

        let exchange = async {
            let resp = req.send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ClientError::from_status(status));
            }
            if status == StatusCode::NO_CONTENT {
                return Ok(ApiResponse::Empty);
            }
            let bytes = resp.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(ApiResponse::Empty);
            }
            Ok::<_, ClientError>(ApiResponse::Json(serde_json::from_slice(&bytes)?))
        };

        let timed_out = || ClientError::Timeout {
            path: path.to_owned(),
            after: self.timeout,
        };
        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Err(ClientError::Http(e))) if e.is_timeout() => Err(timed_out()),
            Ok(result) => result,
            Err(_) => Err(timed_out()),
        };

        match &result {
            Ok(_) => debug!(%method, path, "request completed"),
            Err(e) => warn!(%method, path, error = %e, "request failed"),
        }
        result?.check_business_error()
    }
}

#[async_trait]
impl Backend for RestClient {
    async fn get(&self, path: &str) -> Result<Value> {
        Ok(self.request(Method::GET, path, None).await?.into_value())
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }
}
