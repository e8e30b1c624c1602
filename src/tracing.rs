//! Logging setup for the binary
//!
//! The console layer writes to stderr (stdout carries the view or export)
//! and is filtered by `RUST_LOG` when set, otherwise by the `-v` count:
//! - no flag: `warn`
//! - `-v`: `info` (loads, saves, registry resolution)
//! - `-vv`: `debug` (rebuild and command passes)
//! - `-vvv`: `trace` (layout passes, listing pruning)
//!
//! Module filtering works as usual, e.g. `RUST_LOG=crossmap::projection=trace`.
//!
//! The file layer always logs at `debug` to
//! `~/.config/crossmap/logs/crossmap.log.YYYY-MM-DD`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::LOG_FILE_PREFIX;

/// Console level for a `-v` count
pub fn console_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the console and file layers
pub fn init(verbosity: u8) {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level(verbosity)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: file logging disabled: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
