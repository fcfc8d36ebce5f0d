//! Logger metrics for observability
//!
//! Counters for dispatched records and for how transport invocations settled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Settlement counters
///
/// # Example
///
/// ```
/// use transport_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_delivered();
/// metrics.record_failed();
///
/// assert_eq!(metrics.delivered_count(), 1);
/// assert_eq!(metrics.failed_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records handed to the scheduler
    records_dispatched: AtomicU64,

    /// Transport invocations started
    invocations: AtomicU64,

    /// Invocations that completed successfully
    delivered: AtomicU64,

    /// Invocations that returned an error or panicked
    failed: AtomicU64,

    /// Invocations that did not settle before the timeout
    timed_out: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            records_dispatched: AtomicU64::new(0),
            invocations: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_dispatched(&self) -> u64 {
        self.records_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn timed_out_count(&self) -> u64 {
        self.timed_out.load(Ordering::Relaxed)
    }

    /// Invocations that have settled one way or another
    pub fn settled_count(&self) -> u64 {
        self.delivered_count() + self.failed_count() + self.timed_out_count()
    }

    #[inline]
    pub fn record_dispatched(&self, invocations: usize) -> u64 {
        self.invocations
            .fetch_add(invocations as u64, Ordering::Relaxed);
        self.records_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_timed_out(&self) -> u64 {
        self.timed_out.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of settled invocations that failed or timed out, as a percentage
    ///
    /// Returns 0.0 if nothing has settled yet.
    pub fn failure_rate(&self) -> f64 {
        let settled = self.settled_count() as f64;
        if settled == 0.0 {
            0.0
        } else {
            ((self.failed_count() + self.timed_out_count()) as f64 / settled) * 100.0
        }
    }

    pub fn reset(&self) {
        self.records_dispatched.store(0, Ordering::Relaxed);
        self.invocations.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.timed_out.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_dispatched: AtomicU64::new(self.records_dispatched()),
            invocations: AtomicU64::new(self.invocations()),
            delivered: AtomicU64::new(self.delivered_count()),
            failed: AtomicU64::new(self.failed_count()),
            timed_out: AtomicU64::new(self.timed_out_count()),
        }
    }
}
