//! Tracing setup: human-readable stderr output plus optional JSON file logging.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Map a `-v` count to an `EnvFilter` directive.
pub fn filter_for_verbosity(verbosity: u8, quiet: bool) -> &'static str {
    match verbosity {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Default directory for JSON log files.
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "adra", "adra")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Install the global subscriber.
///
/// The returned guard flushes the JSON file writer on drop and must be held for the
/// lifetime of the process. Installing twice is a no-op. `quiet` only applies at
/// verbosity 0, where it limits stderr to errors.
pub fn init_tracing(verbosity: u8, quiet: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter_for_verbosity(verbosity, quiet)));

    let (json_layer, guard) = match log_dir {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("could not create log directory {}: {e}", dir.display());
                (None, None)
            } else {
                let file_appender = tracing_appender::rolling::daily(dir, "adra.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(EnvFilter::new("debug"));
                (Some(layer), Some(guard))
            }
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init();

    guard
}
