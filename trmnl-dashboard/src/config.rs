//! Configuration management for trmnl-dashboard.
//!
//! Configuration is read once at startup from environment variables,
//! optionally seeded from a `.env` file in the working directory, and is
//! immutable afterwards. Handlers and the display client receive it through
//! their constructors rather than looking anything up themselves.

use std::net::{IpAddr, SocketAddr};

use crate::api_client::DisplayClientConfig;
use crate::error::{Error, Result};

/// Device identifier used when none is configured.
pub const DEFAULT_DEVICE_ID: &str = "XX:XX:XX:XX:XX:XX";

/// Display API base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://trmnl.app/api";

/// Listen address used when none is configured.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Listen port used when none is configured.
pub const DEFAULT_PORT: u16 = 5000;

/// Main configuration structure for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TRMNL API key; `None` means the dashboard is unconfigured
    pub api_key: Option<String>,

    /// Identifier of the display to query
    pub device_id: String,

    /// Display API base URL, without a trailing slash
    pub base_url: String,

    /// Address to listen on
    pub host: IpAddr,

    /// Port to listen on
    pub port: u16,

    /// Verbose logging
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            device_id: DEFAULT_DEVICE_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file, if present, is loaded first; variables already set in
    /// the environment take precedence over it.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the normal case.
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Recognized variables: `TRMNL_API_KEY`, `TRMNL_DEVICE_ID`,
    /// `TRMNL_BASE_URL`, `DASHBOARD_HOST`, `DASHBOARD_PORT`, and
    /// `DASHBOARD_DEBUG`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // An empty key is as good as no key.
        config.api_key = lookup("TRMNL_API_KEY").filter(|key| !key.is_empty());

        if let Some(device_id) = lookup("TRMNL_DEVICE_ID") {
            config.device_id = device_id;
        }

        if let Some(base_url) = lookup("TRMNL_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(host) = lookup("DASHBOARD_HOST") {
            config.host = host.parse().map_err(|_| {
                Error::Config(format!("invalid DASHBOARD_HOST: {:?}", host))
            })?;
        }

        if let Some(port) = lookup("DASHBOARD_PORT") {
            config.port = port.parse().map_err(|_| {
                Error::Config(format!("invalid DASHBOARD_PORT: {:?}", port))
            })?;
        }

        if let Some(debug) = lookup("DASHBOARD_DEBUG") {
            config.debug = debug.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    /// Whether an API key is available.
    pub fn api_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Settings for the display client, if an API key is available.
    pub fn display_client_config(&self) -> Option<DisplayClientConfig> {
        self.api_key.as_ref().map(|api_key| DisplayClientConfig {
            api_key: api_key.clone(),
            device_id: self.device_id.clone(),
            base_url: self.base_url.clone(),
        })
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
