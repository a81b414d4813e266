//! Log output setup for the `deckflow` binary and tests.
//!
//! [`init_tracing`] installs the process-wide subscriber: an `EnvFilter`
//! built from `RUST_LOG` when set, and a human-readable or JSON line
//! formatter. Only the first installation in a process takes effect.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Install the global subscriber.
///
/// `level` applies when `RUST_LOG` is unset or unparsable; `json` switches
/// the formatter to one JSON object per event.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Install the global subscriber from `[logging]` settings. An unknown level
/// falls back to `INFO`.
pub fn init_tracing_from(settings: &LoggingSettings) {
    let level = settings.level.parse().unwrap_or(Level::INFO);
    init_tracing(settings.json, level);
}
