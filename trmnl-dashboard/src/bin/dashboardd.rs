//! TRMNL dashboard daemon.
//!
//! Loads configuration from the environment, then serves the dashboard until
//! SIGINT or SIGTERM.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;

use trmnl_dashboard::api::{self, AppState};
use trmnl_dashboard::config::Config;
use trmnl_dashboard::tracing::{self, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing::init_journald_or_stdout(config.debug);

    if !config.api_configured() {
        warn!("TRMNL_API_KEY is not set; display endpoints will answer 500.");
    }
    info!(
        device_id = %config.device_id,
        base_url = %config.base_url,
        debug = config.debug,
        "Configuration loaded."
    );

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let state = AppState::from_config(config)?;

    let running = CancellationToken::new();
    let mut server = tokio::spawn(api::serve(listener, state, running.clone()));
    info!("Started.");

    let mut sigint = unix::signal(SignalKind::interrupt())?;
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        stopped = &mut server => {
            // The server only returns on its own if it failed.
            stopped??;
            return Ok(());
        }
    }

    trace!("Shutting down.");
    running.cancel();

    server.await??;
    info!("Exiting.");
    Ok(())
}
