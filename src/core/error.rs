//! Error types for the logger system

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A log call named a level that is not registered
    #[error("Unknown log level '{name}'")]
    UnknownLevel { name: String },

    /// Built-in levels can be overridden but never removed
    #[error("Built-in level '{name}' cannot be removed")]
    BuiltinLevel { name: String },

    /// A transport invocation did not settle in time
    #[error("Transport '{transport}' is taking too long to process the log (timeout {timeout:?})")]
    TransportTimeout { transport: String, timeout: Duration },

    /// A transport returned an error or panicked
    #[error("Transport '{transport}' failed: {message}")]
    TransportExecution { transport: String, message: String },

    /// Metadata could not be turned into JSON
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn unknown_level(name: impl Into<String>) -> Self {
        LoggerError::UnknownLevel { name: name.into() }
    }

    pub fn builtin_level(name: impl Into<String>) -> Self {
        LoggerError::BuiltinLevel { name: name.into() }
    }

    pub fn transport_timeout(transport: impl Into<String>, timeout: Duration) -> Self {
        LoggerError::TransportTimeout {
            transport: transport.into(),
            timeout,
        }
    }

    pub fn transport_execution(transport: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportExecution {
            transport: transport.into(),
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        LoggerError::Serialization {
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error came from a transport timing out
    pub fn is_timeout(&self) -> bool {
        matches!(self, LoggerError::TransportTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::unknown_level("verbose");
        assert!(matches!(err, LoggerError::UnknownLevel { .. }));

        let err = LoggerError::config("LoggerConfig", "timeout must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::transport_timeout("dated_file", Duration::from_millis(10));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::unknown_level("verbose");
        assert_eq!(err.to_string(), "Unknown log level 'verbose'");

        let err = LoggerError::transport_execution("console", "broken pipe");
        assert_eq!(err.to_string(), "Transport 'console' failed: broken pipe");

        let err = LoggerError::transport_timeout("slow", Duration::from_millis(250));
        assert_eq!(
            err.to_string(),
            "Transport 'slow' is taking too long to process the log (timeout 250ms)"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("appending log line", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("appending log line"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
