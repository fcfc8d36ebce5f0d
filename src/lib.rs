//! # Transport Logger
//!
//! An ordered multi-transport logging pipeline. Every log call becomes an
//! immutable record that is handed to all registered transports at once.
//!
//! ## Features
//!
//! - **Concurrent Fan-out**: Transports of one call run concurrently
//! - **Per-Transport Ordering**: Each transport can keep its writes in call order
//! - **Failure Isolation**: Errors, panics and timeouts stay inside one invocation
//! - **Completion Signals**: Every call returns a handle that resolves once all
//!   transports have settled
//!
//! ## Example
//!
//! ```
//! use transport_logger::prelude::*;
//! use transport_logger::info;
//!
//! let logger = Logger::builder()
//!     .format("{level.name}: {message} {metadata}")
//!     .transport(transport_fn("stdout", |record, _| {
//!         println!("{}", record.output());
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let port = 8080;
//! let handle = info!(logger, metadata: serde_json::json!({"port": port}), "listening");
//! handle.wait();
//! assert_eq!(handle.record().output(), r#"info: listening {"port":8080}"#);
//! ```

pub mod core;
pub mod macros;
pub mod transports;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::transports::ConsoleTransport;
    #[cfg(feature = "file")]
    pub use crate::transports::{DatedFileTransport, NamedFileTransport};
    pub use crate::transports::DelayTransport;
    pub use crate::core::{
        transport_fn, Clock, Level, LevelFn, LogHandle, LogLevel, LogRecord, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerMetrics, MetaArray, MetaObject, Metadata, ReadySignal,
        Result, Settlement, TimestampFormat, Transport, TransportConfig, TransportId,
        TransportOptions, DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

#[cfg(feature = "console")]
pub use transports::ConsoleTransport;
#[cfg(feature = "file")]
pub use transports::{DatedFileTransport, NamedFileTransport};
pub use transports::DelayTransport;
pub use core::{
    transport_fn, Clock, Level, LevelFn, LogHandle, LogLevel, LogRecord, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, MetaArray, MetaObject, Metadata, ReadySignal,
    Result, Settlement, TimestampFormat, Transport, TransportConfig, TransportId,
    TransportOptions, DEFAULT_SHUTDOWN_TIMEOUT,
};
