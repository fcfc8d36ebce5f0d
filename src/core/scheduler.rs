//! Transport scheduler
//!
//! Every dispatch fans a record out to all registered transports at once. Each
//! invocation runs as its own task and is raced against a timeout by a small
//! supervisor task, so a hung or failing transport only ever settles its own
//! invocation. Ordering across dispatches is not enforced here: each
//! invocation receives two signals and decides for itself what to wait on.
//!
//! ```text
//! dispatch(n-1):  T0 ─┐   T1 ─┐   T2 ─┐          (previous cohort)
//!                     │       │       │
//!                     ├───────┴───────┴──► ready           (join of all three)
//!                     │
//! dispatch(n):    T0 ◄┘ transport_ready    (T0's own previous invocation)
//! ```

use super::error::LoggerError;
use super::metrics::LoggerMetrics;
use super::record::LogRecord;
use super::timestamp::Clock;
use super::transport::{ReadySignal, Transport, TransportOptions};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinError;

/// Default time an invocation may take before it is settled as failed
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Invoked once for every settled transport invocation
pub type SettlementCallback = Arc<dyn Fn(&Settlement) + Send + Sync>;

type SettleFuture = Shared<BoxFuture<'static, Settlement>>;

/// Identity of a registered transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportId(u64);

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal state of one transport invocation
#[derive(Debug, Clone)]
pub enum Settlement {
    Delivered {
        transport: String,
    },
    /// Returned an error, panicked, or timed out
    Failed {
        transport: String,
        error: Arc<LoggerError>,
    },
}

impl Settlement {
    fn failed(transport: String, error: LoggerError) -> Self {
        Settlement::Failed {
            transport,
            error: Arc::new(error),
        }
    }

    pub fn transport(&self) -> &str {
        match self {
            Settlement::Delivered { transport } | Settlement::Failed { transport, .. } => transport,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Settlement::Delivered { .. })
    }

    pub fn is_timeout(&self) -> bool {
        self.error().is_some_and(LoggerError::is_timeout)
    }

    pub fn error(&self) -> Option<&LoggerError> {
        match self {
            Settlement::Delivered { .. } => None,
            Settlement::Failed { error, .. } => Some(error),
        }
    }
}

/// What a log call returns: the record and a completion signal
///
/// `completion()` resolves once every transport invocation triggered by the
/// record has settled. It never fails; individual outcomes are available
/// through `settlements()`.
#[derive(Clone)]
pub struct LogHandle {
    record: Arc<LogRecord>,
    invocations: Vec<SettleFuture>,
    completion: ReadySignal,
}

impl LogHandle {
    pub fn record(&self) -> &LogRecord {
        &self.record
    }

    pub fn completion(&self) -> ReadySignal {
        self.completion.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_ready()
    }

    /// One settlement per transport, in registration order
    pub async fn settlements(&self) -> Vec<Settlement> {
        future::join_all(self.invocations.iter().cloned()).await
    }

    /// Block the current thread until the completion signal resolves
    ///
    /// Must not be called from inside the runtime driving the transports.
    pub fn wait(&self) {
        self.completion.wait();
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle")
            .field("record", &self.record)
            .field("transports", &self.invocations.len())
            .field("complete", &self.is_complete())
            .finish()
    }
}

struct TransportSlot {
    id: TransportId,
    transport: Arc<dyn Transport>,
    // Settlement of this transport's latest invocation; head of its private chain.
    tail: Option<SettleFuture>,
}

/// Fans records out to transports
pub struct TransportScheduler {
    slots: Vec<TransportSlot>,
    previous_cohort: Vec<SettleFuture>,
    next_id: u64,
    timeout: Duration,
    runtime: Handle,
    metrics: Arc<LoggerMetrics>,
    on_settlement: Option<SettlementCallback>,
    name: Option<String>,
    log_folder: PathBuf,
    clock: Clock,
}

impl TransportScheduler {
    /// The runtime behind `runtime` must have its time driver enabled.
    pub fn new(runtime: Handle, timeout: Duration, metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            slots: Vec::new(),
            previous_cohort: Vec::new(),
            next_id: 0,
            timeout,
            runtime,
            metrics,
            on_settlement: None,
            name: None,
            log_folder: PathBuf::from("logs"),
            clock: Clock::Utc,
        }
    }

    #[must_use]
    pub fn with_settlement_callback(mut self, callback: Option<SettlementCallback>) -> Self {
        self.on_settlement = callback;
        self
    }

    /// Logger name, log folder and clock forwarded to every invocation
    #[must_use]
    pub fn with_context(mut self, name: Option<String>, log_folder: PathBuf, clock: Clock) -> Self {
        self.name = name;
        self.log_folder = log_folder;
        self.clock = clock;
        self
    }

    pub fn add(&mut self, transport: Arc<dyn Transport>) -> TransportId {
        let id = TransportId(self.next_id);
        self.next_id += 1;
        self.slots.push(TransportSlot {
            id,
            transport,
            tail: None,
        });
        id
    }

    /// Unregister a transport; its in-flight invocations still settle
    pub fn remove(&mut self, id: TransportId) -> Option<Arc<dyn Transport>> {
        let idx = self.slots.iter().position(|slot| slot.id == id)?;
        Some(self.slots.remove(idx).transport)
    }

    pub fn transports(&self) -> Vec<(TransportId, String)> {
        self.slots
            .iter()
            .map(|slot| (slot.id, slot.transport.name().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves once the most recent cohort has settled
    pub fn idle(&self) -> ReadySignal {
        ReadySignal::join_all(self.previous_cohort.clone())
    }

    /// Start one invocation per transport for `record`
    pub fn dispatch(&mut self, record: Arc<LogRecord>, threshold: i32) -> LogHandle {
        let ready = ReadySignal::join_all(self.previous_cohort.clone());
        let mut cohort = Vec::with_capacity(self.slots.len());

        for slot in &mut self.slots {
            let transport_ready = match slot.tail {
                Some(ref previous) => ReadySignal::from_future(previous.clone()),
                None => ReadySignal::resolved(),
            };
            let options = TransportOptions {
                threshold,
                ready: ready.clone(),
                transport_ready,
                name: self.name.clone(),
                log_folder: self.log_folder.clone(),
                clock: self.clock,
            };
            let settled = invoke(
                &self.runtime,
                self.timeout,
                &self.metrics,
                self.on_settlement.as_ref(),
                Arc::clone(&slot.transport),
                Arc::clone(&record),
                options,
            );
            slot.tail = Some(settled.clone());
            cohort.push(settled);
        }

        self.metrics.record_dispatched(cohort.len());
        self.previous_cohort = cohort.clone();

        LogHandle {
            record,
            completion: ReadySignal::join_all(cohort.clone()),
            invocations: cohort,
        }
    }
}

impl fmt::Debug for TransportScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportScheduler")
            .field("transports", &self.transports())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn invoke(
    runtime: &Handle,
    timeout: Duration,
    metrics: &Arc<LoggerMetrics>,
    on_settlement: Option<&SettlementCallback>,
    transport: Arc<dyn Transport>,
    record: Arc<LogRecord>,
    options: TransportOptions,
) -> SettleFuture {
    let name = transport.name().to_string();
    let work = runtime.spawn(async move { transport.deliver(&record, options).await });

    let supervisor = {
        let name = name.clone();
        let metrics = Arc::clone(metrics);
        let on_settlement = on_settlement.cloned();
        // On timeout the work handle is dropped, which detaches the task: it
        // keeps running in the background but no longer holds up settlement.
        runtime.spawn(async move {
            let settlement = match tokio::time::timeout(timeout, work).await {
                Ok(Ok(Ok(()))) => Settlement::Delivered { transport: name },
                Ok(Ok(Err(e))) => {
                    let error = LoggerError::transport_execution(&name, e.to_string());
                    Settlement::failed(name, error)
                }
                Ok(Err(join_error)) => {
                    let error = LoggerError::transport_execution(&name, join_message(join_error));
                    Settlement::failed(name, error)
                }
                Err(_) => {
                    let error = LoggerError::transport_timeout(&name, timeout);
                    Settlement::failed(name, error)
                }
            };
            report(&settlement, &metrics, on_settlement.as_ref());
            settlement
        })
    };

    async move {
        match supervisor.await {
            Ok(settlement) => settlement,
            Err(join_error) => {
                let error = LoggerError::transport_execution(&name, join_message(join_error));
                Settlement::failed(name, error)
            }
        }
    }
    .boxed()
    .shared()
}

fn report(
    settlement: &Settlement,
    metrics: &LoggerMetrics,
    on_settlement: Option<&SettlementCallback>,
) {
    match settlement.error() {
        None => {
            metrics.record_delivered();
        }
        Some(error) => {
            if error.is_timeout() {
                metrics.record_timed_out();
            } else {
                metrics.record_failed();
            }
            eprintln!("[LOGGER ERROR] {}", error);
        }
    }

    if let Some(callback) = on_settlement {
        callback(settlement);
    }
}

fn join_message(join_error: JoinError) -> String {
    if join_error.is_cancelled() {
        return "invocation cancelled".to_string();
    }
    match join_error.try_into_panic() {
        Ok(panic_info) => {
            if let Some(s) = panic_info.downcast_ref::<&str>() {
                format!("panicked: {}", s)
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                format!("panicked: {}", s)
            } else {
                "panicked: unknown panic".to_string()
            }
        }
        Err(_) => "invocation aborted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;
    use crate::core::metadata::Metadata;
    use crate::core::record::RecordFactory;
    use crate::core::error::Result;
    use crate::core::transport::transport_fn;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(message: &str) -> Arc<LogRecord> {
        let level = Arc::new(Level::new("info", 2, "#00cc30"));
        Arc::new(RecordFactory::default().build(level, message.to_string(), Metadata::Null, None))
    }

    fn scheduler(timeout: Duration) -> TransportScheduler {
        TransportScheduler::new(Handle::current(), timeout, Arc::new(LoggerMetrics::new()))
    }

    /// Sleeps for a per-message delay, optionally after its own previous call
    struct Sleepy {
        sequenced: bool,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for Sleepy {
        async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
            if self.sequenced {
                options.transport_ready.await;
            }
            let delay = record.message().parse::<u64>().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.seen.lock().push(record.message().to_string());
            Ok(())
        }

        fn name(&self) -> &str {
            "sleepy"
        }
    }

    struct Hang;

    #[async_trait]
    impl Transport for Hang {
        async fn deliver(&self, _record: &LogRecord, _options: TransportOptions) -> Result<()> {
            future::pending::<()>().await;
            Ok(())
        }

        fn name(&self) -> &str {
            "hang"
        }
    }

    #[tokio::test]
    async fn test_dispatch_without_transports_completes() {
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT);
        let handle = scheduler.dispatch(record("m"), 0);
        handle.completion().await;
        assert!(handle.settlements().await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_ready_keeps_call_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT);
        scheduler.add(Arc::new(Sleepy {
            sequenced: true,
            seen: Arc::clone(&seen),
        }));

        let first = scheduler.dispatch(record("60"), 0);
        let second = scheduler.dispatch(record("0"), 0);
        second.completion().await;

        assert!(first.is_complete());
        assert_eq!(*seen.lock(), vec!["60", "0"]);
    }

    #[tokio::test]
    async fn test_unsequenced_transport_runs_concurrently() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT);
        scheduler.add(Arc::new(Sleepy {
            sequenced: false,
            seen: Arc::clone(&seen),
        }));

        let first = scheduler.dispatch(record("60"), 0);
        let second = scheduler.dispatch(record("0"), 0);
        first.completion().await;
        second.completion().await;

        assert_eq!(*seen.lock(), vec!["0", "60"]);
    }

    #[tokio::test]
    async fn test_ready_waits_for_previous_cohort() {
        let slow_done = Arc::new(AtomicUsize::new(0));
        let observed = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT);

        struct Slow(Arc<AtomicUsize>);
        #[async_trait]
        impl Transport for Slow {
            async fn deliver(&self, record: &LogRecord, _options: TransportOptions) -> Result<()> {
                let delay = record.message().parse::<u64>().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &str {
                "slow"
            }
        }

        struct Watcher(Arc<AtomicUsize>, Arc<Mutex<Vec<usize>>>);
        #[async_trait]
        impl Transport for Watcher {
            async fn deliver(&self, _record: &LogRecord, options: TransportOptions) -> Result<()> {
                options.ready.await;
                self.1.lock().push(self.0.load(Ordering::SeqCst));
                Ok(())
            }
            fn name(&self) -> &str {
                "watcher"
            }
        }

        scheduler.add(Arc::new(Slow(Arc::clone(&slow_done))));
        scheduler.add(Arc::new(Watcher(Arc::clone(&slow_done), Arc::clone(&observed))));

        scheduler.dispatch(record("50"), 0);
        let second = scheduler.dispatch(record("400"), 0);
        second.completion().await;

        // The first watcher saw an empty previous cohort, the second one waited
        // for the slow transport of the first call.
        assert_eq!(*observed.lock(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_timeout_settles_and_isolates() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&delivered);
        let mut scheduler = scheduler(Duration::from_millis(30));
        scheduler.add(Arc::new(Hang));
        scheduler.add(Arc::new(transport_fn("counter", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));

        let started = std::time::Instant::now();
        let handle = scheduler.dispatch(record("m"), 0);
        let settlements = handle.settlements().await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(settlements[0].is_timeout());
        assert_eq!(settlements[0].transport(), "hang");
        assert!(settlements[1].is_delivered());
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_and_panics_are_isolated() {
        let metrics = Arc::new(LoggerMetrics::new());
        let mut scheduler =
            TransportScheduler::new(Handle::current(), DEFAULT_TRANSPORT_TIMEOUT, Arc::clone(&metrics));
        scheduler.add(Arc::new(transport_fn("failing", |_, _| {
            Err(LoggerError::other("disk full"))
        })));
        scheduler.add(Arc::new(transport_fn("panicking", |_, _| -> Result<()> {
            panic!("sink exploded")
        })));
        scheduler.add(Arc::new(transport_fn("fine", |_, _| Ok(()))));

        let settlements = scheduler.dispatch(record("m"), 0).settlements().await;

        assert!(matches!(
            settlements[0].error(),
            Some(LoggerError::TransportExecution { message, .. }) if message == "disk full"
        ));
        assert!(settlements[1]
            .error()
            .is_some_and(|e| e.to_string().contains("sink exploded")));
        assert!(settlements[2].is_delivered());
        assert_eq!(metrics.failed_count(), 2);
        assert_eq!(metrics.delivered_count(), 1);
    }

    #[tokio::test]
    async fn test_threshold_and_context_forwarded() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT)
            .with_context(Some("app".into()), PathBuf::from("/tmp/logs"), Clock::Local);
        scheduler.add(Arc::new(transport_fn("inspector", move |_, options| {
            *sink.lock() = Some((
                options.threshold,
                options.name.clone(),
                options.log_folder.clone(),
                options.clock,
            ));
            Ok(())
        })));

        scheduler.dispatch(record("m"), 3).completion().await;

        assert_eq!(
            *seen.lock(),
            Some((3, Some("app".to_string()), PathBuf::from("/tmp/logs"), Clock::Local))
        );
    }

    #[tokio::test]
    async fn test_remove_transport() {
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT);
        let a = scheduler.add(Arc::new(transport_fn("a", |_, _| Ok(()))));
        let b = scheduler.add(Arc::new(transport_fn("b", |_, _| Ok(()))));

        assert!(scheduler.remove(a).is_some());
        assert!(scheduler.remove(a).is_none());
        assert_eq!(scheduler.transports(), vec![(b, "b".to_string())]);

        let settlements = scheduler.dispatch(record("m"), 0).settlements().await;
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].transport(), "b");
    }

    #[tokio::test]
    async fn test_settlement_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let observer = Arc::clone(&count);
        let mut scheduler = scheduler(DEFAULT_TRANSPORT_TIMEOUT).with_settlement_callback(Some(
            Arc::new(move |settlement: &Settlement| {
                assert!(settlement.is_delivered());
                observer.fetch_add(1, Ordering::SeqCst);
            }),
        ));
        scheduler.add(Arc::new(transport_fn("a", |_, _| Ok(()))));

        scheduler.dispatch(record("1"), 0).completion().await;
        scheduler.dispatch(record("2"), 0).completion().await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
