//! HTTP client adapter.
//!
//! [`Transport`] is the seam between the binding layer and the wire: the
//! production [`HttpTransport`] wraps `reqwest`, attaches the bearer token,
//! and on a 401 performs one transparent re-authentication attempt before
//! replaying the original call once. Tests substitute a scripted transport.

use crate::descriptor::{Method, RequestDescriptor};
use crate::error::ClientError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one HTTP call described by `descriptor` and decode the JSON
    /// body. Expected failures come back as [`ClientError`], never panics.
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Value, ClientError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    refresh_token: Option<String>,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        refresh_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token: RwLock::new(token),
            refresh_token,
        })
    }

    async fn send_once(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, descriptor.url);
        let mut request = match descriptor.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = self.token.read().await.as_deref() {
            request = request.bearer_auth(token);
        }
        if !descriptor.params.is_empty() {
            request = request.query(&descriptor.params);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ClientError::from)?;
        Ok(response)
    }

    /// Exchange the refresh token for a fresh bearer token.
    async fn refresh_auth(&self) -> Result<(), ClientError> {
        let Some(refresh_token) = &self.refresh_token else {
            return Err(ClientError::Config(
                "no refresh token configured".to_string(),
            ));
        };
        let url = format!("{}/api/refreshToken", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(ClientError::from)?;
        let body = parse_response(response).await?;
        let token = body
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClientError::Decode("refresh response missing token".to_string()))?;
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Value, ClientError> {
        debug!(method = %descriptor.method, url = %descriptor.url, "sending request");
        let response = self.send_once(descriptor).await?;

        // One re-auth attempt, one replay. A second 401 is reported as-is.
        let response = if response.status() == reqwest::StatusCode::UNAUTHORIZED
            && self.refresh_token.is_some()
        {
            warn!(url = %descriptor.url, "401 received, refreshing auth and replaying once");
            self.refresh_auth().await?;
            self.send_once(descriptor).await?
        } else {
            response
        };

        parse_response(response).await
    }
}

async fn parse_response(response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    if status.is_success() {
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response.text().await.map_err(ClientError::from)?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
