use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{CadenceError, Result};

pub const LOG_ENV: &str = "CADENCE_LOG";
pub const LOG_FILE: &str = "cadence.log";

/// Routes tracing output to `<dir>/cadence.log`; the terminal belongs to the
/// TUI. Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging(dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir).map_err(|source| CadenceError::LogDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
