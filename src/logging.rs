use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when `RUST_LOG` is not set.
pub const LOG_ENV: &str = "PORT_SCAN_RS_LOGLEVEL";

/// Default filter directive for the `-q` flag and `-v` count.
pub fn default_directive(quiet: bool, verbosity: u8) -> String {
    let level = match (quiet, verbosity) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Install a stderr tracing subscriber. `RUST_LOG` or [`LOG_ENV`] override the verbosity.
pub fn init_logging(quiet: bool, verbosity: u8) -> Result<()> {
    let directive = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| default_directive(quiet, verbosity));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::new(directive))
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
