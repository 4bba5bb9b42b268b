//! Logging Module
//!
//! Structured logging to a rolling file under the data directory, mirrored to
//! stderr in debug builds.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// Filter directives for this client, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "ACTIVITY_MONITOR_LOG";

const LOG_FILE_PREFIX: &str = "activity-monitor";
const KEEP_LOG_FILES: usize = 7;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so hold it for the
/// life of the process. Returns `None` when the log directory is unusable; the
/// console layer is still installed in that case. A second call leaves the
/// first subscriber in place.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let log_dir = config.log_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEEP_LOG_FILES)
        .build(&log_dir)
        .map_err(|e| eprintln!("File logging disabled: {e}"))
        .ok();

    let (file_writer, guard) = appender.map(tracing_appender::non_blocking).unzip();

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
    });

    let console_layer = cfg!(debug_assertions)
        .then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                EnvFilter::new("debug,hyper=warn,reqwest=warn")
            } else {
                EnvFilter::new("info,hyper=warn,reqwest=warn")
            }
        });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);

    guard
}
