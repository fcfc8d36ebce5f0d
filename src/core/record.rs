//! Log records and the factory that builds them

use super::level::Level;
use super::metadata::Metadata;
use super::origin::Origin;
use super::template;
use super::timestamp::{Clock, TimestampFormat};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Default output template
pub const DEFAULT_FORMAT: &str =
    "{timestamp}\t<{level.name}>\t{file}:{line}\t({method})\t{message} {metadata}";

/// One log call, frozen at creation
///
/// Shared by reference between the history buffer and every transport
/// invocation; there is no way to mutate it once built.
#[derive(Debug, Clone)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    level: Arc<Level>,
    message: String,
    metadata: Metadata,
    origin: Option<Origin>,
    output: String,
}

impl LogRecord {
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// The rendered line transports write
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Builds records and renders their output line
#[derive(Debug, Clone)]
pub struct RecordFactory {
    format: String,
    date_format: TimestampFormat,
    clock: Clock,
    placeholder: Option<String>,
    capture_origin: bool,
}

impl RecordFactory {
    pub fn new(format: impl Into<String>, date_format: TimestampFormat) -> Self {
        Self {
            format: format.into(),
            date_format,
            clock: Clock::Utc,
            placeholder: None,
            capture_origin: true,
        }
    }

    /// Replace unresolved placeholders with `placeholder` instead of leaving them
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Render `{timestamp}` in the time zone of `clock`
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_origin_capture(mut self, enabled: bool) -> Self {
        self.capture_origin = enabled;
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Build a record for the caller's call site
    #[track_caller]
    pub fn build(
        &self,
        level: Arc<Level>,
        message: String,
        metadata: Metadata,
        method: Option<&str>,
    ) -> LogRecord {
        // Not a closure: `#[track_caller]` does not propagate through one.
        let origin = if self.capture_origin {
            Some(Origin::capture(method))
        } else {
            None
        };
        self.build_with(Utc::now(), level, message, metadata, origin)
    }

    /// Build a record from explicit parts
    pub fn build_with(
        &self,
        timestamp: DateTime<Utc>,
        level: Arc<Level>,
        message: String,
        metadata: Metadata,
        origin: Option<Origin>,
    ) -> LogRecord {
        let mut fields = Map::new();
        if let Some(ref origin) = origin {
            origin.write_fields(&mut fields);
        }
        let rendered_time = self.date_format.format_in(&timestamp, self.clock);
        fields.insert("timestamp".into(), rendered_time.into());
        fields.insert(
            "level".into(),
            json!({
                "name": level.name(),
                "rank": level.rank(),
                "level": level.rank(),
                "color": level.color(),
            }),
        );
        fields.insert("message".into(), message.clone().into());
        fields.insert("metadata".into(), render_metadata(&metadata).into());

        let output = template::render(&self.format, &Value::Object(fields), self.placeholder.as_deref());

        LogRecord {
            timestamp,
            level,
            message,
            metadata,
            origin,
            output,
        }
    }
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT, TimestampFormat::default())
    }
}

// Empty values (null, false, zero, "") render as nothing.
fn render_metadata(metadata: &Metadata) -> String {
    if metadata.is_empty_value() {
        return String::new();
    }
    metadata
        .to_json_string()
        .unwrap_or_else(|e| format!("<{}>", e))
}
