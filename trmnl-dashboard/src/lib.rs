//! Web dashboard for a TRMNL e-ink display.
//!
//! The dashboard proxies the TRMNL display API: it renders an HTML page,
//! reports the device's current display content as JSON, and relays the
//! image that content refers to.

pub mod api;
pub mod api_client;
pub mod config;
pub mod error;
pub mod tracing;
