//! Dated file transport: one file per day (or whatever the date pattern yields)

use super::file::{append_record, log_dir};
use crate::core::timestamp::validate_pattern;
use crate::core::{LogRecord, Result, Transport, TransportOptions};
use async_trait::async_trait;
use std::path::PathBuf;

pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";

/// Appends to `<log_folder>/<sub_folders..>/[<name>-]<date>.log`
///
/// The date is taken from the record's timestamp, so a record always lands in
/// the file of the moment it was created. It is rendered in the logger's
/// [`Clock`](crate::core::Clock).
///
/// # Example
///
/// ```no_run
/// use transport_logger::prelude::*;
/// use transport_logger::transports::DatedFileTransport;
///
/// let logger = Logger::builder()
///     .name("api")
///     .transport(DatedFileTransport::new().with_sub_folders(["http"]))
///     .build()
///     .unwrap();
///
/// // logs/http/api-2025-01-08.log
/// logger.info("request served").wait();
/// ```
#[derive(Debug, Clone)]
pub struct DatedFileTransport {
    date_format: String,
    sub_folders: Vec<String>,
}

impl DatedFileTransport {
    pub fn new() -> Self {
        Self {
            date_format: DEFAULT_DATE_PATTERN.to_string(),
            sub_folders: Vec::new(),
        }
    }

    /// Use a strftime pattern for the file name
    pub fn with_date_format(pattern: impl Into<String>) -> Result<Self> {
        let date_format = pattern.into();
        validate_pattern(&date_format)?;
        Ok(Self {
            date_format,
            sub_folders: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_sub_folders<I, S>(mut self, sub_folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_folders = sub_folders.into_iter().map(Into::into).collect();
        self
    }

    /// The file a record is appended to
    pub fn path_for(&self, record: &LogRecord, options: &TransportOptions) -> PathBuf {
        let date = options.clock.format_pattern(record.timestamp(), &self.date_format);
        let file_name = match options.name {
            Some(ref name) => format!("{}-{}.log", name, date),
            None => format!("{}.log", date),
        };
        log_dir(options, &self.sub_folders).join(file_name)
    }
}

impl Default for DatedFileTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for DatedFileTransport {
    async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
        let path = self.path_for(record, &options);
        append_record(&path, record, options).await
    }

    fn name(&self) -> &str {
        "dated_file"
    }
}
