//! Logging setup for the application.
//!
//! Installs a global tracing subscriber that writes to the console and
//! appends to a single log file, so every per-file event and the final
//! report survive the terminal session.

use std::path::{Path, PathBuf};

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, EnvFilter, Registry};

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create the directory holding the log file.
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to open the log file for appending.
    #[error("Failed to open log file {path}: {source}")]
    OpenLogFile { path: PathBuf, source: InitError },
    /// The log path has no file name component.
    #[error("Log path has no file name: {0}")]
    InvalidPath(PathBuf),
    /// Failed to set the global tracing subscriber.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing to the console and the append-mode log file at `log_file`.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// until the program exits. In JSON mode console logs go to stderr so stdout
/// carries only JSON.
pub fn init(log_file: &Path, verbose: bool, json_output: bool) -> Result<WorkerGuard, LoggingError> {
    let appender = open_log_file(log_file)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);
    let subscriber = Registry::default()
        .with(build_env_filter(verbose))
        .with(fmt::layer().with_writer(console_writer(json_output)))
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;

    tracing::debug!("Logging initialized; log file at {}", log_file.display());
    Ok(guard)
}

/// Console-only fallback when the log file cannot be opened.
pub fn init_console_only(verbose: bool, json_output: bool) -> Result<(), LoggingError> {
    let subscriber = Registry::default()
        .with(build_env_filter(verbose))
        .with(fmt::layer().with_writer(console_writer(json_output)));
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)
}

fn console_writer(json_output: bool) -> BoxMakeWriter {
    if json_output {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    }
}

fn open_log_file(log_file: &Path) -> Result<RollingFileAppender, LoggingError> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(log_file.to_path_buf()))?
        .to_string_lossy()
        .into_owned();
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(&dir)
        .map_err(|source| LoggingError::OpenLogFile {
            path: log_file.to_path_buf(),
            source,
        })
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,tif2webp=debug")
        } else {
            EnvFilter::new("info")
        }
    })
}
