//! Tracing setup: stdout plus one log file per launch.
//!
//! Log files carry their launch timestamp in the name, so lexicographic
//! order is chronological; pruning keeps the newest few and never has to
//! touch file metadata.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app_dirs;

/// Log files kept on disk, counting the one for this launch.
const KEEP_LOGS: usize = 10;
const FILE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors raised while setting up logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The application directories could not be resolved or created.
    #[error(transparent)]
    Dirs(#[from] app_dirs::AppDirError),
    /// The launch timestamp could not be formatted into a file name.
    #[error("Could not format log file name: {0}")]
    FileName(#[from] time::error::Format),
    /// The log directory could not be read or pruned.
    #[error("Log directory {path}: {source}")]
    Maintain {
        /// Path the operation failed on.
        path: PathBuf,
        /// Underlying io error.
        source: io::Error,
    },
    /// A global subscriber was already installed.
    #[error(transparent)]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber writing to stdout and a per-launch file.
/// Later calls are no-ops, so callers need not coordinate.
pub fn init() -> Result<(), LoggingError> {
    if GUARD.get().is_some() {
        return Ok(());
    }
    let logs = app_dirs::resolve()?.logs;
    prune_logs(&logs, KEEP_LOGS.saturating_sub(1))?;
    let file_name = launch_file_name(OffsetDateTime::now_utc())?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&logs, &file_name));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer));
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = GUARD.set(guard);

    tracing::info!("Logging to {}", logs.join(file_name).display());
    Ok(())
}

fn launch_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    Ok(format!("unbias-studio-{}.log", now.format(FILE_STAMP)?))
}

/// Remove the oldest `.log` files until at most `keep` remain.
fn prune_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let entries = fs::read_dir(dir).map_err(|source| LoggingError::Maintain {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .collect();
    logs.sort();
    let excess = logs.len().saturating_sub(keep);
    for path in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::Maintain { path, source })?;
    }
    Ok(())
}
