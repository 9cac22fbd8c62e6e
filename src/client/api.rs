//! HTTP client for the feedback endpoints.

use std::env;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::auth::API_KEY_HEADER;
use crate::errors::ErrorResponse;
use crate::models::{Ack, FeedbackEntry, HealthResponse, SubmissionRequest};

/// Errors seen by API callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request never completed or the body could not be decoded.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Operations the feed controller needs from the API.
#[async_trait]
pub trait FeedbackApi: Send + Sync {
    async fn list_feedback(&self, topic_key: &str) -> Result<Vec<FeedbackEntry>, ClientError>;
    async fn create_feedback(&self, request: &SubmissionRequest) -> Result<Ack, ClientError>;
}

/// Build a request URL from the optional API base.
///
/// An empty or absent base keeps the path relative (same origin, behind a
/// reverse proxy); otherwise trailing slashes on the base are dropped.
pub fn api_url(base: Option<&str>, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    match base.map(str::trim) {
        None | Some("") => path,
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
    }
}

/// Client-side settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the page was served from; relative URLs resolve against it
    pub origin: String,
    /// `PORTFOLIO_API_BASE`; empty or absent means same origin
    pub api_base: Option<String>,
    /// Sent with administrative deletes
    pub admin_key: Option<String>,
}

impl ClientConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            api_base: None,
            admin_key: None,
        }
    }

    /// Read the API base from the environment.
    pub fn from_env(origin: impl Into<String>) -> Self {
        Self::from_lookup(origin, |name| env::var(name).ok())
    }

    /// Read the API base through an arbitrary variable lookup.
    pub fn from_lookup<F>(origin: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base: lookup("PORTFOLIO_API_BASE"),
            ..Self::new(origin)
        }
    }
}

/// HTTP client for the feedback API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        let url = api_url(self.config.api_base.as_deref(), path);
        if url.starts_with('/') {
            format!("{}{}", self.config.origin.trim_end_matches('/'), url)
        } else {
            url
        }
    }

    /// GET /api/health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// DELETE /api/feedback/{id} (admin)
    pub async fn delete_feedback(&self, id: &str) -> Result<Ack, ClientError> {
        let mut request = self.http.delete(self.url(&format!("/api/feedback/{}", id)));
        if let Some(key) = &self.config.admin_key {
            request = request.header(API_KEY_HEADER, key);
        }
        Ok(check(request.send().await?).await?.json().await?)
    }
}

#[async_trait]
impl FeedbackApi for ApiClient {
    /// GET /api/feedback?topicKey=
    async fn list_feedback(&self, topic_key: &str) -> Result<Vec<FeedbackEntry>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/feedback"))
            .query(&[("topicKey", topic_key)])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// POST /api/feedback
    async fn create_feedback(&self, request: &SubmissionRequest) -> Result<Ack, ClientError> {
        let response = self
            .http
            .post(self.url("/api/feedback"))
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Pass successful responses through; turn the rest into [`ClientError::Status`].
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) if !body.error.is_empty() => body.error,
        _ => format!("Request failed: {}", status.as_u16()),
    };
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
