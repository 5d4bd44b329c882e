//! Authenticated HTTP client for a single base URL.
//!
//! Used both for a deployed app (`https://<app>.databricksapps.com`) and for
//! the workspace REST API. Every request fetches the bearer token through the
//! shared `CredentialProvider`; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::{Credential, CredentialProvider};
use crate::error::Error;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds for plain requests
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connect timeout for long-lived streaming requests
const STREAM_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Accept header sent with every request
const ACCEPT_ANY: &str = "application/json, text/event-stream";

pub type SharedCredentials = Arc<Mutex<CredentialProvider>>;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    fn from_text(text: String) -> Self {
        if text.is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    /// Pretty JSON, raw text, or `{}` for an empty body.
    pub fn render(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Empty => "{}".to_string(),
        }
    }
}

/// API client bound to one base URL.
/// Clone is cheap - the connection pool and credential cache are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    stream_client: Client,
    base_url: String,
    credentials: SharedCredentials,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: SharedCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(STREAM_CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            stream_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// A client for another base URL sharing this client's credential cache.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            stream_client: self.stream_client.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: self.credentials.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Current bearer token, validated or refreshed as needed.
    pub async fn credential(&self) -> Result<Credential> {
        let mut provider = self.credentials.lock().await;
        provider.get_token().await
    }

    async fn auth_headers(&self, accept: &str) -> Result<header::HeaderMap> {
        let credential = self.credential().await?;
        debug!(token = %credential.preview(), "Using token authentication");

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&credential.bearer())
                .context("Token contains characters not allowed in a header")?,
        );
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, header::HeaderValue::from_str(accept)?);
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Error::from_status(status, &body).into())
        }
    }

    /// Send one request and decode the body as JSON when possible.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ResponseBody> {
        let url = self.url(path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .headers(self.auth_headers(ACCEPT_ANY).await?);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(send_error(&method, &url))?;
        let response = Self::check_response(response).await?;
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        Ok(ResponseBody::from_text(text))
    }

    pub async fn get(&self, path: &str) -> Result<ResponseBody> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<ResponseBody> {
        self.request(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<ResponseBody> {
        self.request(Method::PUT, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseBody> {
        self.request(Method::DELETE, path, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_query(path, &[]).await
    }

    /// GET with query parameters; values are percent-encoded.
    pub async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers(ACCEPT_ANY).await?)
            .query(query)
            .send()
            .await
            .map_err(send_error(&Method::GET, &url))?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers(ACCEPT_ANY).await?)
            .json(body)
            .send()
            .await
            .map_err(send_error(&Method::POST, &url))?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Open a long-lived GET whose body is consumed incrementally.
    pub async fn open_stream(&self, path: &str, accept: &str) -> Result<Response> {
        let url = self.url(path);
        let response = self
            .stream_client
            .get(&url)
            .headers(self.auth_headers(accept).await?)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to connect to {}: {}", url, e)))?;
        Self::check_response(response).await
    }
}

fn send_error<'a>(method: &'a Method, url: &'a str) -> impl FnOnce(reqwest::Error) -> Error + 'a {
    move |e| Error::Transport(format!("Failed to send {} request to {}: {}", method, url, e))
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
