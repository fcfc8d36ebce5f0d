//! Main logger implementation

use super::{
    config::{LevelConfig, LoggerConfig, TransportConfig},
    error::{LoggerError, Result},
    history::HistoryBuffer,
    level::{Level, LevelRegistry, LogLevel},
    metadata::Metadata,
    metrics::LoggerMetrics,
    record::RecordFactory,
    scheduler::{LogHandle, SettlementCallback, TransportId, TransportScheduler},
    timestamp::{Clock, TimestampFormat},
    transport::{ReadySignal, Transport},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// When a logger that owns its runtime is dropped, it waits this long for the
/// latest cohort of transport invocations to settle.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Fans every log call out to a set of transports
///
/// A log call builds an immutable record, starts one invocation per
/// registered transport and returns immediately with a [`LogHandle`]. The
/// handle's completion signal resolves once every invocation has settled.
///
/// # Example
///
/// ```
/// use transport_logger::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&lines);
///
/// let logger = Logger::builder()
///     .format("<{level.name}> {message}")
///     .transport(transport_fn("memory", move |record, _| {
///         sink.lock().unwrap().push(record.output().to_string());
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// logger.info("started").wait();
/// assert_eq!(*lines.lock().unwrap(), vec!["<info> started"]);
/// ```
pub struct Logger {
    levels: LevelRegistry,
    // Name to level lookup, fixed at construction
    level_index: HashMap<String, Arc<Level>>,
    factory: RecordFactory,
    scheduler: Mutex<TransportScheduler>,
    history: Mutex<HistoryBuffer<LogHandle>>,
    threshold: AtomicI32,
    metrics: Arc<LoggerMetrics>,
    runtime: Option<Runtime>,
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a logger from a configuration
    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::new().config(config).build()
    }

    /// Log at a level given by name
    ///
    /// Fails only if `level` is not registered; transport failures never
    /// surface here.
    #[track_caller]
    pub fn log(
        &self,
        level: &str,
        message: impl Into<String>,
        metadata: impl Into<Metadata>,
    ) -> Result<LogHandle> {
        let level = self.resolve(level)?;
        Ok(self.emit(level, message.into(), metadata.into(), None))
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) -> LogHandle {
        self.log_builtin(LogLevel::Trace, message.into(), Metadata::Null, None)
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) -> LogHandle {
        self.log_builtin(LogLevel::Debug, message.into(), Metadata::Null, None)
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> LogHandle {
        self.log_builtin(LogLevel::Info, message.into(), Metadata::Null, None)
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) -> LogHandle {
        self.log_builtin(LogLevel::Warn, message.into(), Metadata::Null, None)
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> LogHandle {
        self.log_builtin(LogLevel::Error, message.into(), Metadata::Null, None)
    }

    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> LogHandle {
        self.log_builtin(LogLevel::Fatal, message.into(), Metadata::Null, None)
    }

    /// Log with structured metadata at a built-in level
    #[track_caller]
    pub fn log_with(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: impl Into<Metadata>,
    ) -> LogHandle {
        self.log_builtin(level, message.into(), metadata.into(), None)
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __log_macro(
        &self,
        level: LogLevel,
        message: String,
        metadata: Metadata,
        module: &'static str,
    ) -> LogHandle {
        self.log_builtin(level, message, metadata, Some(module))
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __log_named_macro(
        &self,
        level: &str,
        message: String,
        metadata: Metadata,
        module: &'static str,
    ) -> Result<LogHandle> {
        let level = self.resolve(level)?;
        Ok(self.emit(level, message, metadata, Some(module)))
    }

    /// A bound log function for a registered level
    ///
    /// # Example
    ///
    /// ```
    /// use transport_logger::prelude::*;
    ///
    /// let logger = Logger::builder().level("extra", 1).build().unwrap();
    /// let extra = logger.level_fn("extra").unwrap();
    ///
    /// let handle = extra.log("custom", Metadata::Null);
    /// assert_eq!(handle.record().level().name(), "extra");
    /// ```
    pub fn level_fn(&self, name: &str) -> Result<LevelFn<'_>> {
        Ok(LevelFn {
            logger: self,
            level: self.resolve(name)?,
        })
    }

    /// Registered level names: built-ins first, then user levels
    pub fn levels(&self) -> Vec<String> {
        self.levels.names()
    }

    /// Resolve a level name to its current definition
    pub fn resolve(&self, name: &str) -> Result<Arc<Level>> {
        self.level_index
            .get(name)
            .cloned()
            .ok_or_else(|| LoggerError::unknown_level(name))
    }

    /// Set the minimum rank transports should act on
    ///
    /// In-flight invocations keep the value they were started with.
    pub fn set_threshold(&self, rank: i32) {
        self.threshold.store(rank, Ordering::Relaxed);
    }

    /// Set the threshold to the rank of a registered level
    pub fn set_threshold_level(&self, name: &str) -> Result<()> {
        let level = self.resolve(name)?;
        self.set_threshold(level.rank());
        Ok(())
    }

    pub fn threshold(&self) -> i32 {
        self.threshold.load(Ordering::Relaxed)
    }

    /// Retained handles, newest first
    pub fn history(&self) -> Vec<LogHandle> {
        self.history.lock().all()
    }

    pub fn add_transport<T: Transport + 'static>(&self, transport: T) -> TransportId {
        self.scheduler.lock().add(Arc::new(transport))
    }

    /// Unregister a transport; invocations already started still settle
    pub fn remove_transport(&self, id: TransportId) -> bool {
        self.scheduler.lock().remove(id).is_some()
    }

    /// Registered transports in invocation order
    pub fn transports(&self) -> Vec<(TransportId, String)> {
        self.scheduler.lock().transports()
    }

    /// Resolves once the most recent log call has fully settled
    pub fn flush(&self) -> ReadySignal {
        self.scheduler.lock().idle()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use transport_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .transport(transport_fn("noop", |_, _| Ok(())))
    ///     .build()
    ///     .unwrap();
    ///
    /// logger.info("one").wait();
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.records_dispatched(), 1);
    /// println!("Failure rate: {:.2}%", metrics.failure_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    #[track_caller]
    fn log_builtin(
        &self,
        level: LogLevel,
        message: String,
        metadata: Metadata,
        method: Option<&str>,
    ) -> LogHandle {
        let level = Arc::clone(self.levels.builtin(level));
        self.emit(level, message, metadata, method)
    }

    #[track_caller]
    fn emit(
        &self,
        level: Arc<Level>,
        message: String,
        metadata: Metadata,
        method: Option<&str>,
    ) -> LogHandle {
        let record = Arc::new(self.factory.build(level, message, metadata, method));
        let threshold = self.threshold();

        // History is recorded under the scheduler lock so that it stays in
        // dispatch order.
        let mut scheduler = self.scheduler.lock();
        let handle = scheduler.dispatch(record, threshold);
        self.history.lock().record(handle.clone());
        handle
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("levels", &self.levels.names())
            .field("threshold", &self.threshold())
            .field("scheduler", &*self.scheduler.lock())
            .field("owns_runtime", &self.runtime.is_some())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        // Blocking is only possible outside of any runtime.
        if Handle::try_current().is_err() {
            let idle = self.flush();
            if runtime
                .block_on(async { tokio::time::timeout(DEFAULT_SHUTDOWN_TIMEOUT, idle).await })
                .is_err()
            {
                eprintln!(
                    "[LOGGER WARNING] Transports did not settle within {:?} timeout. \
                     Some logs may be lost.",
                    DEFAULT_SHUTDOWN_TIMEOUT
                );
            }
        }

        let failed = self.metrics.failed_count() + self.metrics.timed_out_count();
        if failed > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} failed transport invocations \
                 (failure rate: {:.2}%)",
                failed,
                self.metrics.failure_rate()
            );
        }

        runtime.shutdown_background();
    }
}

/// Log function bound to one level
#[derive(Clone)]
pub struct LevelFn<'a> {
    logger: &'a Logger,
    level: Arc<Level>,
}

impl LevelFn<'_> {
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[track_caller]
    pub fn log(&self, message: impl Into<String>, metadata: impl Into<Metadata>) -> LogHandle {
        self.logger
            .emit(Arc::clone(&self.level), message.into(), metadata.into(), None)
    }
}

impl fmt::Debug for LevelFn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelFn").field("level", &self.level).finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// Transports described in the configuration are registered first, followed
/// by transports added with [`LoggerBuilder::transport`] in call order.
///
/// # Example
/// ```
/// use transport_logger::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .name("api")
///     .log_folder("/var/log/api")
///     .history_capacity(10)
///     .transport_timeout(Duration::from_millis(500))
///     .level("audit", 6)
///     .on_settlement(Arc::new(|settlement: &Settlement| {
///         if let Some(error) = settlement.error() {
///             eprintln!("ALERT: {}", error);
///         }
///     }))
///     .build()
///     .unwrap();
///
/// assert!(logger.levels().contains(&"audit".to_string()));
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    removed_levels: Vec<String>,
    transports: Vec<Arc<dyn Transport>>,
    runtime: Option<Handle>,
    on_settlement: Option<SettlementCallback>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            removed_levels: Vec::new(),
            transports: Vec::new(),
            runtime: None,
            on_settlement: None,
        }
    }

    /// Replace every configurable value with `config`
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Set the output template
    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn date_format(mut self, date_format: TimestampFormat) -> Self {
        self.config.date_format = date_format;
        self
    }

    /// Render timestamps and dated file names in UTC or local time
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.config.clock = clock;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.log_folder = folder.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn transport_timeout(mut self, timeout: Duration) -> Self {
        self.config.transport_timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    /// Substitute for placeholders that do not resolve
    #[must_use = "builder methods return a new value"]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = Some(placeholder.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, rank: i32) -> Self {
        self.config.threshold = rank;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn capture_origin(mut self, enabled: bool) -> Self {
        self.config.capture_origin = enabled;
        self
    }

    /// Register a level with the default color
    ///
    /// A built-in name overrides that level in place.
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, name: impl Into<String>, rank: i32) -> Self {
        self.config.levels.push(LevelConfig {
            name: name.into(),
            rank,
            color: None,
        });
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level_with_color(
        mut self,
        name: impl Into<String>,
        rank: i32,
        color: impl Into<String>,
    ) -> Self {
        self.config.levels.push(LevelConfig {
            name: name.into(),
            rank,
            color: Some(color.into()),
        });
        self
    }

    /// Remove a user level; `build` fails for built-in or unknown names
    #[must_use = "builder methods return a new value"]
    pub fn remove_level(mut self, name: impl Into<String>) -> Self {
        self.removed_levels.push(name.into());
        self
    }

    /// Add a transport
    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    /// Add a built-in transport from its configuration
    #[must_use = "builder methods return a new value"]
    pub fn transport_config(mut self, transport: TransportConfig) -> Self {
        self.config.transports.push(transport);
        self
    }

    /// Run transports on `handle` instead of the ambient or an owned runtime
    #[must_use = "builder methods return a new value"]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Set a callback invoked for every settled transport invocation
    #[must_use = "builder methods return a new value"]
    pub fn on_settlement(mut self, callback: SettlementCallback) -> Self {
        self.on_settlement = Some(callback);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            removed_levels,
            transports,
            runtime,
            on_settlement,
        } = self;
        config.validate()?;

        let mut levels = LevelRegistry::new();
        for level in &config.levels {
            levels.register(level.to_level());
        }
        for name in &removed_levels {
            levels.remove(name)?;
        }
        let level_index = levels
            .iter()
            .map(|level| (level.name().to_string(), Arc::clone(level)))
            .collect();

        let factory = RecordFactory::new(config.format.clone(), config.date_format.clone())
            .with_placeholder(config.placeholder.clone())
            .with_clock(config.clock)
            .with_origin_capture(config.capture_origin);

        let (handle, owned) = match runtime {
            Some(handle) => (handle, None),
            None => match Handle::try_current() {
                Ok(handle) => (handle, None),
                Err(_) => {
                    let runtime = start_runtime()?;
                    (runtime.handle().clone(), Some(runtime))
                }
            },
        };

        let metrics = Arc::new(LoggerMetrics::new());
        let mut scheduler =
            TransportScheduler::new(handle, config.transport_timeout(), Arc::clone(&metrics))
                .with_settlement_callback(on_settlement)
                .with_context(config.name.clone(), config.log_folder.clone(), config.clock);
        for transport in &config.transports {
            scheduler.add(crate::transports::from_config(transport)?);
        }
        for transport in transports {
            scheduler.add(transport);
        }

        Ok(Logger {
            levels,
            level_index,
            factory,
            scheduler: Mutex::new(scheduler),
            history: Mutex::new(HistoryBuffer::new(config.history_capacity)),
            threshold: AtomicI32::new(config.threshold),
            metrics,
            runtime: owned,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn start_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("log-transport")
        .enable_all()
        .build()
        .map_err(|e| LoggerError::io_operation("starting transport runtime", e.to_string(), e))
}
