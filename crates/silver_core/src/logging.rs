//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Start the rolling file logger once per process.
//! - Route panics into the log with sanitized payloads.
//!
//! # Invariants
//! - Initialization is idempotent for an identical configuration.
//! - A second initialization with a different level or directory is rejected.
//! - Initialization never panics.
//! - Core log events carry metadata only (ids, counts, line numbers), never
//!   bullet content.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "silver";
const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Supported log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(LoggingError::UnsupportedLevel(other.to_string())),
        }
    }
}

/// Errors from logging initialization.
#[derive(Debug)]
pub enum LoggingError {
    /// Level string is not one of `trace|debug|info|warn|error`.
    UnsupportedLevel(String),
    /// Log directory is blank or relative.
    InvalidDirectory(String),
    /// Log directory could not be created.
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Logger backend failed to start.
    Backend(flexi_logger::FlexiLoggerError),
    /// Logging already runs with a different configuration.
    AlreadyInitialized { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(value) => {
                write!(f, "log directory must be a non-empty absolute path, got `{value}`")
            }
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already initialized with {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// File logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub log_dir: PathBuf,
    /// Rotation threshold per log file.
    pub max_file_bytes: u64,
    /// Number of rotated files kept on disk.
    pub max_files: usize,
}

impl LoggingConfig {
    /// Builds a configuration with default rotation limits.
    ///
    /// # Errors
    /// - `UnsupportedLevel` for unknown level strings.
    /// - `InvalidDirectory` when `log_dir` is blank or relative.
    pub fn new(level: &str, log_dir: &str) -> Result<Self, LoggingError> {
        let level = level.parse()?;
        let trimmed = log_dir.trim();
        if trimmed.is_empty() || !Path::new(trimmed).is_absolute() {
            return Err(LoggingError::InvalidDirectory(log_dir.to_string()));
        }
        Ok(Self {
            level,
            log_dir: PathBuf::from(trimmed),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files: DEFAULT_MAX_FILES,
        })
    }

    fn describe(&self) -> String {
        format!("level `{}` at `{}`", self.level, self.log_dir.display())
    }
}

/// Starts rolling file logs under `config.log_dir`.
///
/// # Errors
/// - `AlreadyInitialized` when logging runs with another configuration.
/// - `CreateDirectory` / `Backend` when the logger cannot start.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_logger(config))?;
    if active.config != *config {
        return Err(LoggingError::AlreadyInitialized {
            active: active.config.describe(),
            requested: config.describe(),
        });
    }
    Ok(())
}

/// Returns the active logging configuration, if logging was initialized.
pub fn logging_status() -> Option<LoggingConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

/// Default level for the current build mode: `debug` or `info`.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

fn start_logger(config: &LoggingConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: config.log_dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(config.level.as_str())
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(config.max_file_bytes),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // Timestamp and source location per line: [date time tz] LEVEL [module] file:line: msg
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook_once();
    info!(
        "event=core_init module=core status=ok level={} platform={} version={}",
        config.level,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

fn install_panic_hook_once() {
    PANIC_HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|message| (*message).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(
                "event=panic_captured module=core status=error location={} payload={}",
                location,
                sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
            );
            previous(panic_info);
        }));
    });
}

/// Flattens line breaks and caps length; panic payloads may quote user text.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
