//! Structured logging
//!
//! Installs the global `tracing` subscriber: JSON or text output, written
//! through a non-blocking writer to stdout or to a size-rotated log file.

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Keeps the background log writer alive; drop it only at shutdown.
pub struct Logger {
    _guard: WorkerGuard,
}

impl Logger {
    /// Initialize the logging system based on configuration
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;

        // RUST_LOG wins over the configured level when present
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = build_writer(config)?;

        let fmt_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
            "text" => fmt::layer()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_line_number(true)
                .boxed(),
            other => anyhow::bail!("Invalid format configuration: {}", other),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

fn build_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    match config.output.as_str() {
        "stdout" => Ok(tracing_appender::non_blocking(std::io::stdout())),
        "file" => {
            let log_file = config
                .log_file
                .as_ref()
                .context("log_file must be specified when output is 'file'")?;

            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent).context("Failed to create log directory")?;
            }

            let appender =
                SizeRotatingFile::new(log_file.clone(), config.max_file_size, config.max_backups);
            Ok(tracing_appender::non_blocking(appender))
        }
        other => anyhow::bail!("Invalid output configuration: {}", other),
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}

/// Log file that rotates to `<name>.1 .. <name>.N` once it exceeds a size limit.
///
/// Only the non-blocking worker thread writes to it, so no interior locking is needed.
pub struct SizeRotatingFile {
    path: PathBuf,
    max_file_size: usize,
    max_backups: usize,
    file: Option<File>,
    written: usize,
}

impl SizeRotatingFile {
    pub fn new(path: PathBuf, max_file_size: usize, max_backups: usize) -> Self {
        Self {
            path,
            max_file_size,
            max_backups,
            file: None,
            written: 0,
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> std::io::Result<()> {
        self.file = None;

        for i in (1..self.max_backups).rev() {
            let from = self.backup_path(i);
            if from.exists() {
                std::fs::rename(&from, self.backup_path(i + 1))?;
            }
        }

        if self.path.exists() {
            std::fs::rename(&self.path, self.backup_path(1))?;
        }

        self.written = 0;
        Ok(())
    }

    fn open(path: &Path) -> std::io::Result<(File, usize)> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len() as usize;
        Ok((file, len))
    }
}

impl Write for SizeRotatingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.file.is_some() && self.written + buf.len() > self.max_file_size {
            self.rotate()?;
        }

        if self.file.is_none() {
            let (file, len) = Self::open(&self.path)?;
            self.written = len;
            self.file = Some(file);
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "log file unavailable"))?;

        let written = file.write(buf)?;
        self.written += written;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
