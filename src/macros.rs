//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!`, record the calling
//! module as the origin method and accept an optional `metadata: <expr>,`
//! prefix for structured data.
//!
//! # Examples
//!
//! ```
//! use transport_logger::prelude::*;
//! use transport_logger::info;
//!
//! let logger = Logger::builder().build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With metadata
//! let handle = info!(logger, metadata: serde_json::json!({"user": 42}), "login");
//! assert_eq!(handle.record().metadata().to_json()["user"], 42);
//! ```

/// Log at a level given by name.
///
/// Evaluates to `Result<LogHandle>`; fails if the level is not registered.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// use transport_logger::log;
/// let logger = Logger::builder().level("audit", 6).build().unwrap();
///
/// log!(logger, "audit", "Simple message").unwrap();
/// log!(logger, "audit", metadata: "extra", "Code: {}", 500).unwrap();
/// assert!(log!(logger, "verbose", "no such level").is_err());
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, metadata: $meta:expr, $($arg:tt)+) => {
        $logger.__log_named_macro(
            $level,
            format!($($arg)+),
            $crate::Metadata::from($meta),
            module_path!(),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.__log_named_macro(
            $level,
            format!($($arg)+),
            $crate::Metadata::Null,
            module_path!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_builtin {
    ($logger:expr, $level:expr, metadata: $meta:expr, $($arg:tt)+) => {
        $logger.__log_macro(
            $level,
            format!($($arg)+),
            $crate::Metadata::from($meta),
            module_path!(),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.__log_macro($level, format!($($arg)+), $crate::Metadata::Null, module_path!())
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use transport_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_builtin!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use transport_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_builtin!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use transport_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_builtin!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use transport_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_builtin!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use transport_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_builtin!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// # Examples
///
/// ```
/// # use transport_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use transport_logger::fatal;
/// fatal!(logger, "Critical system failure");
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log_builtin!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
