//! Timestamp formatting for rendered output
//!
//! Custom patterns use chrono's strftime syntax. Patterns are validated up
//! front so that formatting a record can never panic on a bad specifier.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Default human readable pattern: `2025-01-08 10:30:45.123`
pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// RFC 3339 with offset: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// strftime pattern
    Custom(String),
}

/// Time zone timestamps are rendered in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clock {
    #[default]
    Utc,
    /// The host's local time zone
    Local,
}

impl Clock {
    /// Format `datetime` with a strftime pattern in this clock's time zone
    pub fn format_pattern(self, datetime: &DateTime<Utc>, pattern: &str) -> String {
        match self {
            Clock::Utc => format_pattern(datetime, pattern),
            Clock::Local => format_pattern(&datetime.with_timezone(&Local), pattern),
        }
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Custom(DEFAULT_DATE_PATTERN.to_string())
    }
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        self.format_in(datetime, Clock::Utc)
    }

    /// Format in the time zone of `clock`
    #[must_use]
    pub fn format_in(&self, datetime: &DateTime<Utc>, clock: Clock) -> String {
        match clock {
            Clock::Utc => self.render(datetime),
            Clock::Local => self.render(&datetime.with_timezone(&Local)),
        }
    }

    fn render<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            TimestampFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => format_pattern(datetime, pattern),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            TimestampFormat::Custom(pattern) => validate_pattern(pattern),
            _ => Ok(()),
        }
    }
}

/// Format with a strftime pattern; an invalid pattern yields an empty string
pub fn format_pattern<Tz>(datetime: &DateTime<Tz>, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", datetime.format(pattern)).is_err() {
        out.clear();
    }
    out
}

pub fn validate_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(LoggerError::config(
            "date format",
            format!("invalid strftime pattern '{}'", pattern),
        ));
    }
    Ok(())
}
