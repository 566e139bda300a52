//! HTTP client for the instrument API
//!
//! `PanelClient` speaks the endpoint contract from [`crate::api`] over
//! `reqwest`. Command bodies are form-encoded because the server reads
//! them as form values, not JSON.

use crate::api::{
    ApiResponse, CommandSink, ScreenApi, TouchPoint, KEYP_PATH, REFRESH_SCREEN_PATH, TOUCH_PATH,
};
use async_trait::async_trait;
use cellview_core::{ConnectionError, Result};
use reqwest::{RequestBuilder, Url};
use std::time::Duration;

/// HTTP implementation of [`ScreenApi`] and [`CommandSink`]
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl PanelClient {
    /// Create a client for the server at `base_url`
    ///
    /// `request_timeout` bounds every request; the refresh endpoint relies
    /// on it to report a slow network as a timeout.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ConnectionError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConnectionError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConnectionError::Transport {
                endpoint: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            request_timeout,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request deadline
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Resolve an absolute path (optionally with a query) against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| {
                ConnectionError::InvalidUrl {
                    url: path.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Download the screenshot addressed by `path`
    ///
    /// `path` is what the poller publishes in `ScreenUpdated`, e.g.
    /// `/api/screen/screen?date=1429000000123`.
    pub async fn fetch_screen(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.map_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectionError::HttpStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_error(path, e))?;
        tracing::debug!("Fetched screenshot {} ({} bytes)", path, bytes.len());
        Ok(bytes.to_vec())
    }

    async fn post(
        &self,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<ApiResponse> {
        let url = self.endpoint(path)?;
        let request = build(self.http.post(url).timeout(self.request_timeout));

        let response = request.send().await.map_err(|e| self.map_error(path, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(path, e))?;

        match serde_json::from_slice::<ApiResponse>(&body) {
            Ok(envelope) => {
                if !status.is_success() {
                    tracing::debug!(
                        "{} answered HTTP {} with envelope: {}",
                        path,
                        status.as_u16(),
                        envelope.data
                    );
                }
                Ok(envelope)
            }
            Err(e) if status.is_success() => Err(ConnectionError::Decode {
                endpoint: path.to_string(),
                reason: e.to_string(),
            }
            .into()),
            Err(_) => Err(ConnectionError::HttpStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
            }
            .into()),
        }
    }

    fn map_error(&self, path: &str, err: reqwest::Error) -> cellview_core::Error {
        if err.is_timeout() {
            ConnectionError::ConnectionTimeout {
                timeout_ms: self.request_timeout.as_millis() as u64,
            }
            .into()
        } else {
            ConnectionError::Transport {
                endpoint: path.to_string(),
                reason: err.to_string(),
            }
            .into()
        }
    }
}

#[async_trait]
impl ScreenApi for PanelClient {
    async fn refresh_screen(&self) -> Result<ApiResponse> {
        self.post(REFRESH_SCREEN_PATH, |req| req).await
    }
}

#[async_trait]
impl CommandSink for PanelClient {
    async fn touch(&self, point: TouchPoint) -> Result<ApiResponse> {
        let form = [("x", point.x.to_string()), ("y", point.y.to_string())];
        self.post(TOUCH_PATH, |req| req.form(&form)).await
    }

    async fn key_press(&self, value: &str) -> Result<ApiResponse> {
        if value.is_empty() {
            return Err(ConnectionError::InvalidRequest {
                reason: "keyp value missing".to_string(),
            }
            .into());
        }
        let form = [("value", value)];
        self.post(KEYP_PATH, |req| req.form(&form)).await
    }
}
