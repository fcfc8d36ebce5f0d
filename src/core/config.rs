//! Logger configuration
//!
//! Everything a logger needs can be described in a serializable
//! [`LoggerConfig`], including the transport list.
//!
//! # Example
//!
//! ```
//! use transport_logger::LoggerConfig;
//!
//! let config = LoggerConfig::from_json(r#"{
//!     "name": "api",
//!     "history_capacity": 10,
//!     "levels": [{"name": "audit", "rank": 6}],
//!     "transports": [{"kind": "named_file", "sub_folders": ["api"]}]
//! }"#).unwrap();
//!
//! assert_eq!(config.history_capacity, 10);
//! assert_eq!(config.transport_timeout_ms, 1000);
//! ```

use super::error::{LoggerError, Result};
use super::level::{Level, LogLevel};
use super::record::DEFAULT_FORMAT;
use super::timestamp::{validate_pattern, Clock, TimestampFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default folder file transports write under
pub const DEFAULT_LOG_FOLDER: &str = "logs";
/// Default date pattern used in dated file names
pub const DEFAULT_FILE_DATE_PATTERN: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Logger name, used by file transports to build file names
    pub name: Option<String>,
    /// Output template, see [`crate::core::template`]
    pub format: String,
    /// How `{timestamp}` is rendered
    pub date_format: TimestampFormat,
    /// Time zone for `{timestamp}` and dated file names
    pub clock: Clock,
    pub log_folder: PathBuf,
    pub history_capacity: usize,
    pub transport_timeout_ms: u64,
    /// Substitute for unresolved placeholders; `None` leaves them verbatim
    pub placeholder: Option<String>,
    /// Initial threshold rank
    pub threshold: i32,
    pub capture_origin: bool,
    pub levels: Vec<LevelConfig>,
    pub transports: Vec<TransportConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: None,
            format: DEFAULT_FORMAT.to_string(),
            date_format: TimestampFormat::default(),
            clock: Clock::Utc,
            log_folder: PathBuf::from(DEFAULT_LOG_FOLDER),
            history_capacity: 100,
            transport_timeout_ms: 1000,
            placeholder: None,
            threshold: 0,
            capture_origin: true,
            levels: Vec::new(),
            transports: Vec::new(),
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.transport_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.transport_timeout_ms == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "transport_timeout_ms must be greater than zero",
            ));
        }
        self.date_format.validate()?;
        for level in &self.levels {
            if level.name.is_empty() {
                return Err(LoggerError::config("LevelConfig", "level name must not be empty"));
            }
        }
        for transport in &self.transports {
            transport.validate()?;
        }
        Ok(())
    }
}

/// A user level; the color defaults to the trace color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    pub rank: i32,
    #[serde(default)]
    pub color: Option<String>,
}

impl LevelConfig {
    pub fn to_level(&self) -> Level {
        let color = self
            .color
            .clone()
            .unwrap_or_else(|| LogLevel::Trace.default_color().to_string());
        Level::new(self.name.clone(), self.rank, color)
    }
}

/// Built-in transports that can be described declaratively
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    Console {
        #[serde(default = "default_true")]
        colors: bool,
    },
    DatedFile {
        #[serde(default = "default_file_date_pattern")]
        date_format: String,
        #[serde(default)]
        sub_folders: Vec<String>,
    },
    NamedFile {
        #[serde(default)]
        sub_folders: Vec<String>,
    },
    Delay {
        millis: u64,
    },
}

impl TransportConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            TransportConfig::DatedFile { date_format, .. } => validate_pattern(date_format),
            #[cfg(not(feature = "console"))]
            TransportConfig::Console { .. } => Err(LoggerError::config(
                "TransportConfig",
                "console transport requires the `console` feature",
            )),
            _ => Ok(()),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_file_date_pattern() -> String {
    DEFAULT_FILE_DATE_PATTERN.to_string()
}
