//! Common error types for trmnl-dashboard.
//!
//! Failures that can stop the daemon from starting (bad configuration, an
//! HTTP client that cannot be built, a port that cannot be bound) are
//! collected here. Upstream display API failures are not errors in this
//! sense; they travel as data inside
//! [`DisplayResult`](crate::api_client::DisplayResult).

use thiserror::Error;

/// Main error type for trmnl-dashboard operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from tokio or std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
