//! Append-only file helpers shared by the file transports

use crate::core::{LogRecord, LoggerError, Result, TransportOptions};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// `<log_folder>/<sub_folders..>`
pub(crate) fn log_dir(options: &TransportOptions, sub_folders: &[String]) -> PathBuf {
    let mut dir = options.log_folder.clone();
    dir.extend(sub_folders);
    dir
}

/// Create the file's directory, wait for this transport's previous write,
/// then append the record's output as one line
///
/// Directory creation runs before the wait so that it overlaps with the
/// previous invocation; only the append itself is sequenced.
pub(crate) async fn append_record(
    path: &Path,
    record: &LogRecord,
    options: TransportOptions,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                format!("{}: {}", parent.display(), e),
                e,
            )
        })?;
    }

    options.transport_ready.await;

    let mut line = String::with_capacity(record.output().len() + 1);
    line.push_str(record.output());
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| {
            LoggerError::io_operation("opening log file", format!("{}: {}", path.display(), e), e)
        })?;
    file.write_all(line.as_bytes()).await.map_err(|e| {
        LoggerError::io_operation("appending to log file", format!("{}: {}", path.display(), e), e)
    })?;
    file.flush().await.map_err(LoggerError::from)?;

    Ok(())
}
