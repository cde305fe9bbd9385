//! Provide tracing, tailored to this program.
//!
//! The daemon calls [`init_journald_or_stdout`] once at startup to install a
//! tracing subscriber. Everything else can `use crate::tracing::prelude::*`
//! for the `trace!()`, `debug!()`, `info!()`, `warn!()`, and `error!()`
//! macros.

use std::env;
use time::OffsetDateTime;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{format::Writer, time::FormatTime},
    prelude::*,
};

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{debug, error, info, trace, warn};
}

use prelude::*;

/// Initialize logging.
///
/// If running under systemd, use journald; otherwise fall back to stdout.
/// With `debug` set, the default level is DEBUG instead of INFO.
pub fn init_journald_or_stdout(debug: bool) {
    let level = default_level(debug);

    if env::var("JOURNAL_STREAM").is_ok() {
        if let Ok(layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter(level))
                .with(layer)
                .init();
        } else {
            use_stdout(level);
            error!("Failed to initialize journald logging, using stdout.");
        }
    } else {
        use_stdout(level);
    }
}

fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

// Filter according to environment variable RUST_LOG, falling back to the
// given level for anything RUST_LOG doesn't mention.
fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy()
}

fn use_stdout(level: LevelFilter) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_timer(LocalTimer))
        .init();
}

// Timestamps in local time to the nearest second. The default timer is UTC
// with sub-second precision, which is noise for a request log.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now =
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let formatted = now
            .format(time::macros::format_description!(
                "[hour]:[minute]:[second]"
            ))
            .map_err(|_| std::fmt::Error)?;
        write!(w, "{}", formatted)
    }
}
