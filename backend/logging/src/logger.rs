//! Structured Logger
//!
//! Human-readable console output and a daily-rolling JSON file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_PREFIX: &str = "pagetree.log";

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process. When `log_dir` cannot be created only the console
/// layer is installed and `None` is returned.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let log_dir = log_dir.as_ref();
    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            // logs/pagetree.log.YYYY-MM-DD
            let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer.boxed()), Some(guard))
        }
        Err(e) => {
            eprintln!("cannot create log dir {}: {e}", log_dir.display());
            (None, None)
        }
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}
