//! Tracing subscriber setup
//!
//! Events go to stderr and to a log file in the data directory. `RUST_LOG`
//! overrides the default `info` filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the program. Without a writable log directory only
/// stderr is used.
pub fn init(log_path: &Path, json: bool) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_writer, guard) = match file_appender(log_path) {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    let stderr_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let stderr_text = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_json)
        .with(stderr_text)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn file_appender(
    log_path: &Path,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = log_path.parent()?;
    let file_name = log_path.file_name()?;
    std::fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}
