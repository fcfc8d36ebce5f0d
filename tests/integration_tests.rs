//! Integration tests for the transport pipeline
//!
//! These tests verify:
//! - Per-transport append order with file transports
//! - Timeout isolation of hung transports
//! - Threshold handling
//! - History bounds and order
//! - Custom levels and cyclic metadata
//! - Configuration driven setup

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use transport_logger::prelude::*;
use transport_logger::{info, warn};

/// Never settles
struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn deliver(&self, _record: &LogRecord, _options: TransportOptions) -> Result<()> {
        futures::future::pending::<()>().await;
        Ok(())
    }

    fn name(&self) -> &str {
        "hanging"
    }
}

/// Counts the records it acts on, honoring the threshold
struct ThresholdCounter(Arc<AtomicUsize>);

#[async_trait]
impl Transport for ThresholdCounter {
    async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
        if record.level().rank() >= options.threshold {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "threshold_counter"
    }
}

#[test]
fn test_file_append_order_matches_call_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .name("ordered")
        .format("{message}")
        .log_folder(temp_dir.path())
        .transport(NamedFileTransport::new())
        .transport(DelayTransport::new(Duration::from_millis(1)))
        .build()
        .expect("Failed to build logger");

    let mut last = None;
    for i in 0..50 {
        last = Some(logger.info(format!("line {}", i)));
    }
    last.expect("logged at least once").wait();

    let content = fs::read_to_string(temp_dir.path().join("ordered.log"))
        .expect("Failed to read log file");
    let expected: Vec<String> = (0..50).map(|i| format!("line {}", i)).collect();
    assert_eq!(content.lines().collect::<Vec<_>>(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hung_transport_times_out_without_blocking_others() {
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);
    let logger = Logger::builder()
        .transport_timeout(Duration::from_millis(100))
        .transport(HangingTransport)
        .transport(transport_fn("counter", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .build()
        .expect("Failed to build logger");

    let started = Instant::now();
    let handle = logger.info("first");
    handle.completion().await;
    assert!(started.elapsed() < Duration::from_secs(1));

    let settlements = handle.settlements().await;
    assert!(settlements[0].is_timeout());
    assert!(matches!(
        settlements[0].error(),
        Some(LoggerError::TransportTimeout { transport, .. }) if transport == "hanging"
    ));
    assert!(settlements[1].is_delivered());

    // The next call is not held up by the detached invocation.
    logger.info("second").completion().await;
    assert_eq!(delivered.load(Ordering::SeqCst), 2);
    assert_eq!(logger.metrics().timed_out_count(), 2);
}

#[tokio::test]
async fn test_failures_never_reach_the_caller() {
    let logger = Logger::builder()
        .transport(transport_fn("failing", |_, _| Err(LoggerError::other("boom"))))
        .transport(transport_fn("panicking", |_, _| -> Result<()> {
            panic!("transport bug")
        }))
        .build()
        .expect("Failed to build logger");

    let handle = logger.error("still logged");
    handle.completion().await;

    let settlements = handle.settlements().await;
    assert_eq!(settlements.len(), 2);
    assert!(settlements.iter().all(|s| !s.is_delivered()));
    assert_eq!(logger.metrics().failed_count(), 2);
}

#[tokio::test]
async fn test_threshold_skips_side_effects() {
    let count = Arc::new(AtomicUsize::new(0));
    let logger = Logger::builder()
        .transport(ThresholdCounter(Arc::clone(&count)))
        .transport(ConsoleTransport::with_colors(false))
        .build()
        .expect("Failed to build logger");

    logger.set_threshold_level("fatal").expect("fatal is built in");
    let handle = logger.warn("below threshold");
    handle.completion().await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(handle.settlements().await.iter().all(Settlement::is_delivered));

    logger.fatal("at threshold").completion().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_history_is_bounded_and_newest_first() {
    let logger = Logger::builder()
        .history_capacity(5)
        .build()
        .expect("Failed to build logger");

    for i in 0..12 {
        logger.debug(i.to_string());
    }

    let history = logger.history();
    assert_eq!(history.len(), 5);
    let messages: Vec<_> = history.iter().map(|h| h.record().message()).collect();
    assert_eq!(messages, vec!["11", "10", "9", "8", "7"]);
}

#[tokio::test]
async fn test_custom_level_is_listed_and_used() {
    let logger = Logger::builder()
        .level("extra", 1)
        .build()
        .expect("Failed to build logger");

    assert!(logger.levels().iter().any(|name| name == "extra"));
    let handle = logger
        .log("extra", "custom level", Metadata::Null)
        .expect("extra is registered");
    assert_eq!(handle.record().level().name(), "extra");
}

#[tokio::test]
async fn test_self_referencing_metadata_renders_marker() {
    let logger = Logger::builder()
        .format("{message} {metadata}")
        .build()
        .expect("Failed to build logger");

    let request = MetaObject::new().with("path", "/health");
    request.insert("self", request.clone());
    let items = MetaArray::new().with(1);
    items.push(items.clone());
    request.insert("items", items);

    let handle = warn!(logger, metadata: request, "cyclic");
    assert_eq!(
        handle.record().output(),
        r#"cyclic {"path":"/health","self":"@Object","items":[1,"@Array"]}"#
    );
}

#[tokio::test]
async fn test_unresolved_placeholders() {
    let logger = Logger::builder()
        .format("{message} {request.id}")
        .build()
        .expect("Failed to build logger");
    assert_eq!(logger.info("kept").record().output(), "kept {request.id}");

    let logger = Logger::builder()
        .format("{message} {request.id}")
        .placeholder("-")
        .build()
        .expect("Failed to build logger");
    assert_eq!(logger.info("replaced").record().output(), "replaced -");
}

#[test]
fn test_logger_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let json = format!(
        r##"{{
            "name": "app",
            "format": "{{level.name}} {{message}}",
            "log_folder": {folder},
            "levels": [{{"name": "audit", "rank": 6, "color": "#ffffff"}}],
            "transports": [
                {{"kind": "dated_file", "sub_folders": ["daily"]}},
                {{"kind": "named_file"}}
            ]
        }}"##,
        folder = serde_json::to_string(temp_dir.path()).expect("path serializes")
    );
    let config = LoggerConfig::from_json(&json).expect("Failed to parse config");
    let logger = Logger::from_config(config).expect("Failed to build logger");

    let handle = logger.log("audit", "checked", Metadata::Null).expect("audit level");
    handle.wait();

    let date = handle.record().timestamp().format("%Y-%m-%d").to_string();
    let dated = temp_dir.path().join("daily").join(format!("app-{}.log", date));
    let named = temp_dir.path().join("app.log");
    assert_eq!(fs::read_to_string(dated).expect("dated file"), "audit checked\n");
    assert_eq!(fs::read_to_string(named).expect("named file"), "audit checked\n");
}

#[test]
fn test_settlement_callback_and_concurrent_callers() {
    let settled = Arc::new(AtomicUsize::new(0));
    let observer = Arc::clone(&settled);
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);

    let logger = Arc::new(
        Logger::builder()
            .history_capacity(1000)
            .on_settlement(Arc::new(move |_: &Settlement| {
                observer.fetch_add(1, Ordering::SeqCst);
            }))
            .transport(transport_fn("memory", move |record, _| {
                sink.lock().push(record.message().to_string());
                Ok(())
            }))
            .build()
            .expect("Failed to build logger"),
    );

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..25 {
                    info!(logger, "thread {} message {}", t, i);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().expect("logging thread panicked");
    }

    futures::executor::block_on(logger.flush());
    for handle in logger.history() {
        handle.wait();
    }

    assert_eq!(lines.lock().len(), 100);
    assert_eq!(settled.load(Ordering::SeqCst), 100);
    assert_eq!(logger.metrics().records_dispatched(), 100);
}
