//! HTTP API Implementation
//!
//! [`OriaApi`] over reqwest against a running ORIA server. Every request
//! sends JSON and expects JSON. The session cookie, when configured, rides
//! along as a default header so every call is authenticated the way the
//! browser's same-origin cookie would be.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde_json::Value;

use super::error::ApiError;
use super::traits::{Endpoint, OriaApi};
use crate::config::ServerConfig;

/// ORIA server client
#[derive(Clone, Debug)]
pub struct HttpApi {
    /// Scheme, host and port, without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpApi {
    /// Create a client for `base_url`
    pub fn new(
        base_url: impl Into<String>,
        session_cookie: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::Transport(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            http_client: builder.build()?,
        })
    }

    /// Create from `ServerConfig`
    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        Self::new(
            config.base_url.clone(),
            config.session_cookie.as_deref(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Full URL of an endpoint
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl OriaApi for HttpApi {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<(u16, Value), ApiError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "ORIA request");

        let request = if endpoint.is_get() {
            self.http_client.get(&url)
        } else {
            // POST endpoints always take a JSON body, even if empty
            self.http_client
                .post(&url)
                .json(&body.unwrap_or_else(|| Value::Object(serde_json::Map::new())))
        };

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "ORIA request failed");
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let value = match serde_json::from_str(&text) {
            Ok(value) => value,
            // Error pages are often HTML; let the status speak for them
            Err(_) if !(200..300).contains(&status) => Value::Null,
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(%url, status, "ORIA response");
        Ok((status, value))
    }
}
