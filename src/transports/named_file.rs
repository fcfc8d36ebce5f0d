//! Named file transport

use super::file::{append_record, log_dir};
use crate::core::{LogRecord, Result, Transport, TransportOptions};
use async_trait::async_trait;
use std::path::PathBuf;

/// File name used when the logger has no name
pub const DEFAULT_FILE_NAME: &str = "default";

/// Appends to `<log_folder>/<sub_folders..>/<name>.log`
#[derive(Debug, Clone, Default)]
pub struct NamedFileTransport {
    sub_folders: Vec<String>,
}

impl NamedFileTransport {
    pub fn new() -> Self {
        Self::default()
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

    pub fn path_for(&self, options: &TransportOptions) -> PathBuf {
        let name = options.name.as_deref().unwrap_or(DEFAULT_FILE_NAME);
        log_dir(options, &self.sub_folders).join(format!("{}.log", name))
    }
}

#[async_trait]
impl Transport for NamedFileTransport {
    async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
        let path = self.path_for(&options);
        append_record(&path, record, options).await
    }

    fn name(&self) -> &str {
        "named_file"
    }
}
