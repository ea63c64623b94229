//! Tracing initialization for the CLI

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
const LOG_ENV: &str = "QUOTESYNC_LOG";

/// Install the stderr subscriber
///
/// `QUOTESYNC_LOG` wins when set (e.g. `QUOTESYNC_LOG=quotesync=debug`);
/// otherwise `warn`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .with(filter)
        .init();
}
