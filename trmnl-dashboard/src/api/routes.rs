//! Dashboard endpoints.

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use super::{pages, AppState, PageError};
use crate::tracing::prelude::*;

/// Content type assumed for proxied images that don't declare one.
pub const DEFAULT_IMAGE_TYPE: &str = "image/png";

/// Body of the 500 returned by the JSON endpoints when no API key is set.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl Default for ConfigErrorResponse {
    fn default() -> Self {
        Self {
            success: false,
            error: "Configuration Error".to_string(),
            message: "TRMNL API key not configured".to_string(),
        }
    }
}

/// Dashboard page.
async fn index(State(state): State<AppState>) -> impl IntoResponse {
    pages::index(&state.config.device_id, state.config.api_configured(), None)
}

/// Current display content as JSON.
///
/// Upstream failures are reported inside the body with `success: false`;
/// the HTTP status is 200 either way. Only a missing API key yields 500.
///
/// # Example
/// ```bash
/// curl http://localhost:5000/api/status
/// ```
async fn status(State(state): State<AppState>) -> Response {
    let Some(source) = state.display.as_ref() else {
        warn!("Status requested but no TRMNL API key is configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ConfigErrorResponse::default()),
        )
            .into_response();
    };

    let result = source.fetch_display_content().await;
    (StatusCode::OK, Json(result)).into_response()
}

/// Fullscreen view of the current display image.
async fn image(State(state): State<AppState>) -> Result<impl IntoResponse, PageError> {
    let source = state.display.as_ref().ok_or(PageError::Internal)?;

    let result = source.fetch_display_content().await;
    let content = result.outcome.as_ref().map_err(|_| PageError::NotFound)?;
    let image_url = content.image_url().ok_or(PageError::NotFound)?;

    Ok(pages::image(
        image_url,
        content.filename(),
        &state.config.device_id,
    ))
}

/// Relay the current display image so the browser loads it from our origin.
///
/// Anything short of a 200 from the image host is a 404 here; the reason is
/// logged, not returned.
async fn image_proxy(State(state): State<AppState>) -> Result<Response, PageError> {
    let source = state.display.as_ref().ok_or(PageError::Internal)?;

    let result = source.fetch_display_content().await;
    let image_url = result.image_url().ok_or(PageError::NotFound)?;

    let image = source.fetch_image(image_url).await.map_err(|e| {
        debug!(url = %image_url, error = %e, "Image fetch failed");
        PageError::NotFound
    })?;

    let content_type = image
        .content_type
        .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], image.body).into_response())
}

/// Build the dashboard routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(status))
        // Same as status; the upstream has no separate refresh call.
        .route("/api/refresh", get(status))
        .route("/image", get(image))
        .route("/image/proxy", get(image_proxy))
        .with_state(state)
}
