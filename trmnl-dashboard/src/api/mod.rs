//! HTTP server.
//!
//! Serves the dashboard page, the JSON status API, and the image viewer and
//! proxy. Built on Axum; the handlers live in [`routes`], the HTML documents
//! in [`pages`].

pub mod pages;
pub mod routes;

use std::{any::Any, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::api_client::{DisplayClient, DisplaySource};
use crate::config::Config;
use crate::error::Result;
use crate::tracing::prelude::*;

/// Shared application state for the handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration
    pub config: Arc<Config>,
    /// Display API access; `None` when no API key is configured
    pub display: Option<Arc<dyn DisplaySource>>,
}

impl AppState {
    /// State backed by a real display client, if the config allows one.
    pub fn from_config(config: Config) -> Result<Self> {
        let display = match config.display_client_config() {
            Some(client_config) => {
                Some(Arc::new(DisplayClient::new(client_config)?) as Arc<dyn DisplaySource>)
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            display,
        })
    }

    /// State with an arbitrary display source.
    pub fn with_source(config: Config, display: Option<Arc<dyn DisplaySource>>) -> Self {
        Self {
            config: Arc::new(config),
            display,
        }
    }
}

/// Failures rendered as the dashboard page with an error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    NotFound,
    Internal,
}

impl PageError {
    fn status(self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> &'static str {
        match self {
            PageError::NotFound => "Page not found",
            PageError::Internal => "Internal server error",
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        // Like any error page, this one doesn't know which device it's for.
        let page = pages::index("", false, Some(self.message()));
        (self.status(), page).into_response()
    }
}

async fn not_found() -> PageError {
    PageError::NotFound
}

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");
    PageError::Internal.into_response()
}

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    with_error_pages(routes::routes(state))
}

// Fallback 404 page, panic-to-500 page, and request tracing.
fn with_error_pages(app: Router) -> Router {
    let on_panic: fn(Box<dyn Any + Send + 'static>) -> Response = internal_error;
    app.fallback(not_found)
        .layer(CatchPanicLayer::custom(on_panic))
        .layer(TraceLayer::new_for_http())
}

/// Serve the dashboard on `listener` until `running` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    running: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Listening.");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { running.cancelled().await })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_route_is_not_found_page() {
        let state = AppState::with_source(Config::default(), None);

        let response = router(state)
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let page = body_text(response).await;
        assert!(page.contains("TRMNL Dashboard"));
        assert!(page.contains("Page not found"));
    }

    async fn boom() -> &'static str {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_panic_is_internal_error_page() {
        let state = AppState::with_source(Config::default(), None);
        let app = with_error_pages(routes::routes(state).route("/boom", get(boom)));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = body_text(response).await;
        assert!(page.contains("TRMNL Dashboard"));
        assert!(page.contains("Internal server error"));

        // The rest of the app keeps serving after a panic.
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_state_without_api_key_has_no_source() {
        let state = AppState::from_config(Config::default()).unwrap();
        assert!(state.display.is_none());

        let configured = Config {
            api_key: Some("test-key".into()),
            ..Config::default()
        };
        let state = AppState::from_config(configured).unwrap();
        assert!(state.display.is_some());
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let running = CancellationToken::new();
        let server = tokio::spawn(serve(
            listener,
            AppState::with_source(Config::default(), None),
            running.clone(),
        ));

        let response = reqwest::get(format!("http://{}/", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.text().await.unwrap().contains("TRMNL Dashboard"));

        running.cancel();
        server.await.unwrap().unwrap();
    }
}
