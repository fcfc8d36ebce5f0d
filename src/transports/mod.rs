//! Built-in transport implementations

#[cfg(feature = "console")]
pub mod console;
pub mod delay;
#[cfg(feature = "file")]
pub mod dated_file;
#[cfg(feature = "file")]
pub mod file;
#[cfg(feature = "file")]
pub mod named_file;

#[cfg(feature = "console")]
pub use console::ConsoleTransport;
#[cfg(feature = "file")]
pub use dated_file::DatedFileTransport;
pub use delay::DelayTransport;
#[cfg(feature = "file")]
pub use named_file::NamedFileTransport;

// Re-export the trait for convenience
pub use crate::core::Transport;

use crate::core::{LoggerError, Result, TransportConfig};
use std::sync::Arc;
use std::time::Duration;

/// Instantiate a built-in transport from its configuration
pub fn from_config(config: &TransportConfig) -> Result<Arc<dyn Transport>> {
    match config {
        #[cfg(feature = "console")]
        TransportConfig::Console { colors } => Ok(Arc::new(ConsoleTransport::with_colors(*colors))),
        #[cfg(feature = "file")]
        TransportConfig::DatedFile {
            date_format,
            sub_folders,
        } => Ok(Arc::new(
            DatedFileTransport::with_date_format(date_format.clone())?
                .with_sub_folders(sub_folders.iter().cloned()),
        )),
        #[cfg(feature = "file")]
        TransportConfig::NamedFile { sub_folders } => Ok(Arc::new(
            NamedFileTransport::new().with_sub_folders(sub_folders.iter().cloned()),
        )),
        TransportConfig::Delay { millis } => {
            Ok(Arc::new(DelayTransport::new(Duration::from_millis(*millis))))
        }
        #[allow(unreachable_patterns)]
        other => Err(LoggerError::config(
            "TransportConfig",
            format!("{:?} is not available with the enabled features", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_names() {
        let delay = from_config(&TransportConfig::Delay { millis: 1 }).unwrap();
        assert_eq!(delay.name(), "delay");

        #[cfg(feature = "file")]
        {
            let named = from_config(&TransportConfig::NamedFile {
                sub_folders: vec![],
            })
            .unwrap();
            assert_eq!(named.name(), "named_file");

            let bad = from_config(&TransportConfig::DatedFile {
                date_format: "%Y-%".into(),
                sub_folders: vec![],
            });
            assert!(bad.is_err());
        }
    }
}
