//! TRMNL display API client.
//!
//! [`DisplayClient`] wraps the one upstream endpoint the dashboard needs,
//! `GET {base_url}/display`, plus the follow-up download of the image that
//! endpoint points at. Calls never fail from the caller's point of view:
//! every outcome, including network errors, comes back as a
//! [`DisplayResult`] to be inspected.
//!
//! Handlers talk to the client through the [`DisplaySource`] trait so they
//! can be exercised without a network.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};

use crate::error::Result;
use crate::tracing::prelude::*;

pub use types::{DisplayContent, DisplayError, DisplayResult, FetchedImage};

/// Timeout applied to every outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of display content and images.
#[async_trait]
pub trait DisplaySource: Send + Sync {
    /// Fetch what the device is currently showing.
    async fn fetch_display_content(&self) -> DisplayResult;

    /// Download an image referenced by display content.
    async fn fetch_image(&self, url: &str) -> std::result::Result<FetchedImage, DisplayError>;
}

/// Settings fixed when the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayClientConfig {
    /// Sent as the `Access-Token` header
    pub api_key: String,
    /// Sent as the `ID` header
    pub device_id: String,
    /// API root, e.g. `https://trmnl.app/api`
    pub base_url: String,
}

/// HTTP client for the display API.
#[derive(Debug, Clone)]
pub struct DisplayClient {
    config: DisplayClientConfig,
    http: reqwest::Client,
}

impl DisplayClient {
    /// Build a client. Fails only if the HTTP stack can't be initialized.
    pub fn new(config: DisplayClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { config, http })
    }

    fn display_url(&self) -> String {
        format!("{}/display", self.config.base_url)
    }

    async fn request_display(&self) -> std::result::Result<DisplayContent, DisplayError> {
        let response = self
            .http
            .get(self.display_url())
            .header("ID", &self.config.device_id)
            .header("Access-Token", &self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            return Err(DisplayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // A 200 that isn't JSON is reported like any other unreadable answer.
        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body).map_err(|e| {
            DisplayError::Connection(format!("invalid JSON in response: {}", e))
        })?;

        Ok(DisplayContent(value))
    }
}

#[async_trait]
impl DisplaySource for DisplayClient {
    async fn fetch_display_content(&self) -> DisplayResult {
        let outcome = self.request_display().await;

        match &outcome {
            Ok(_) => debug!(device_id = %self.config.device_id, "Fetched display content"),
            Err(e) => warn!(
                device_id = %self.config.device_id,
                error = %e,
                detail = %e.message(),
                "Display API request failed"
            ),
        }

        DisplayResult::now(outcome)
    }

    async fn fetch_image(&self, url: &str) -> std::result::Result<FetchedImage, DisplayError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DisplayError::Api {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(FetchedImage { body, content_type })
    }
}
