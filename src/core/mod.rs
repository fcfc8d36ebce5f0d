//! Core pipeline types and traits

pub mod config;
pub mod error;
pub mod history;
pub mod level;
pub mod logger;
pub mod metadata;
pub mod metrics;
pub mod origin;
pub mod record;
pub mod scheduler;
pub mod template;
pub mod timestamp;
pub mod transport;

pub use config::{LevelConfig, LoggerConfig, TransportConfig};
pub use error::{LoggerError, Result};
pub use history::HistoryBuffer;
pub use level::{Level, LevelRegistry, LogLevel};
pub use logger::{LevelFn, Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metadata::{MetaArray, MetaObject, Metadata};
pub use metrics::LoggerMetrics;
pub use origin::Origin;
pub use record::{LogRecord, RecordFactory, DEFAULT_FORMAT};
pub use scheduler::{
    LogHandle, Settlement, SettlementCallback, TransportId, TransportScheduler,
    DEFAULT_TRANSPORT_TIMEOUT,
};
pub use timestamp::{Clock, TimestampFormat};
pub use transport::{transport_fn, FnTransport, ReadySignal, Transport, TransportOptions};
