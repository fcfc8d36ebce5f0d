//! Log levels and the level registry
//!
//! Six built-in levels are always present. User levels are merged on top of
//! them when the logger is built: a user level with a built-in name replaces
//! that level in place, any other name is appended in declaration order.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The built-in levels, in rank order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    pub fn rank(&self) -> i32 {
        *self as i32
    }

    /// Default display color as a `#rrggbb` hex string
    pub fn default_color(&self) -> &'static str {
        match self {
            LogLevel::Trace => "#0099ff",
            LogLevel::Debug => "#00cc99",
            LogLevel::Info => "#00cc30",
            LogLevel::Warn => "#ffcc00",
            LogLevel::Error => "#ff0000",
            LogLevel::Fatal => "#a70000",
        }
    }

    fn to_level(self) -> Level {
        Level::new(self.as_str(), self.rank(), self.default_color())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(LoggerError::unknown_level(s)),
        }
    }
}

/// A resolved level: name, numeric rank and a display hint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    name: String,
    rank: i32,
    color: String,
}

impl Level {
    pub fn new(name: impl Into<String>, rank: i32, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank,
            color: color.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> i32 {
        self.rank
    }

    /// Opaque display hint, `#rrggbb` for the built-ins
    pub fn color(&self) -> &str {
        &self.color
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered set of levels: built-ins first, then user levels in declaration order
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    // The first `LogLevel::ALL.len()` slots always hold the built-ins, in rank order.
    levels: Vec<Arc<Level>>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self {
            levels: LogLevel::ALL
                .iter()
                .map(|level| Arc::new(level.to_level()))
                .collect(),
        }
    }

    /// Add a level, fully replacing any existing level with the same name
    pub fn register(&mut self, level: Level) {
        match self.position(level.name()) {
            Some(idx) => self.levels[idx] = Arc::new(level),
            None => self.levels.push(Arc::new(level)),
        }
    }

    /// Remove a user level
    ///
    /// Built-in levels cannot be removed, only overridden.
    pub fn remove(&mut self, name: &str) -> Result<Arc<Level>> {
        if LogLevel::ALL.iter().any(|builtin| builtin.as_str() == name) {
            return Err(LoggerError::builtin_level(name));
        }
        let idx = self
            .position(name)
            .ok_or_else(|| LoggerError::unknown_level(name))?;
        Ok(self.levels.remove(idx))
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Level>> {
        self.position(name)
            .map(|idx| Arc::clone(&self.levels[idx]))
            .ok_or_else(|| LoggerError::unknown_level(name))
    }

    /// The current definition of a built-in level, including overrides
    pub fn builtin(&self, level: LogLevel) -> &Arc<Level> {
        &self.levels[level as usize]
    }

    pub fn names(&self) -> Vec<String> {
        self.levels.iter().map(|level| level.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Level>> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.name() == name)
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
