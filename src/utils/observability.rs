use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use super::file_io::open_file_for_append;
use crate::Error;
use crate::Result;

/// Sends `tracing` output to `<log_dir>/dircache.trace` through a
/// non-blocking writer. Keep the returned guard alive for as long as logs
/// should be written.
///
/// Fails if a global subscriber is already installed.
pub fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    let log_file = open_file_for_append(&log_dir.join("dircache.trace"))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry()
        .with(base_subscriber)
        .try_init()
        .map_err(|e| Error::Fatal(format!("install tracing subscriber: {e}")))?;

    Ok(guard)
}
