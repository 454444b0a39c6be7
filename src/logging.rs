/// Structured logging for the air-quality monitoring service
///
/// Provides context-rich logging with location identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for long-running collection.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::{AqError, TransportError};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    OpenMeteo,
    Collector,
    Aggregator,
    Dataset,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::OpenMeteo => write!(f, "OPENMETEO"),
            DataSource::Collector => write!(f, "COLLECT"),
            DataSource::Aggregator => write!(f, "AGG"),
            DataSource::Dataset => write!(f, "DATASET"),
            DataSource::Config => write!(f, "CFG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - caller asked for something we never had (unknown location)
    Expected,
    /// Unexpected failure - indicates upstream degradation or a schema change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, source: &DataSource, location: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, source, location_part, message)
    }

    fn log(&self, level: LogLevel, source: &DataSource, location: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, source, location, message);
        let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Logs go to stderr so stdout stays clean for JSON output.
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                _ => eprintln!("   {}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, location_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, location_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, source: DataSource, location: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, location, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, location: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, location, message);
}

/// Log a warning message
pub fn warn(source: DataSource, location: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, location, message);
}

/// Log an error message
pub fn error(source: DataSource, location: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, location, message);
}

/// Log a debug message
pub fn debug(source: DataSource, location: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, location, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a terminal failure for a single location
pub fn classify_failure(err: &AqError) -> FailureType {
    match err {
        AqError::LocationNotFound(_) => FailureType::Expected,
        // A changed payload shape means the upstream schema moved under us
        AqError::MalformedResponse { .. } => FailureType::Unexpected,
        AqError::Fetch { cause, .. } => match cause {
            TransportError::Status(code) if *code >= 500 => FailureType::Unknown,
            TransportError::Status(_) => FailureType::Unexpected,
            TransportError::Body(_) => FailureType::Unexpected,
            TransportError::Request(_) => FailureType::Unknown,
        },
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a per-location failure with automatic classification
pub fn log_location_failure(location: &str, operation: &str, err: &AqError) {
    let failure_type = classify_failure(err);

    let message = format!(
        "{} failed [{}]: {}",
        operation,
        failure_type,
        err
    );

    match failure_type {
        FailureType::Expected => debug(DataSource::OpenMeteo, Some(location), &message),
        FailureType::Unexpected => error(DataSource::OpenMeteo, Some(location), &message),
        FailureType::Unknown => warn(DataSource::OpenMeteo, Some(location), &message),
    }
}

// ---------------------------------------------------------------------------
// Collection Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a multi-location collection
pub fn log_collection_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Collection complete: {}/{} successful, {} failed",
        successful,
        total,
        failed
    );

    if failed == 0 {
        info(DataSource::Collector, None, &message);
    } else if successful == 0 {
        error(DataSource::Collector, None, &message);
    } else {
        warn(DataSource::Collector, None, &message);
    }
}
