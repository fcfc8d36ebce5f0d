//! Artificial latency, for exercising timeouts and ordering

use crate::core::{LogRecord, Result, Transport, TransportOptions};
use async_trait::async_trait;
use std::time::Duration;

/// Waits for the previous log call to settle everywhere, then sleeps
#[derive(Debug, Clone, Copy)]
pub struct DelayTransport {
    delay: Duration,
}

impl DelayTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Transport for DelayTransport {
    async fn deliver(&self, _record: &LogRecord, options: TransportOptions) -> Result<()> {
        options.ready.await;
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "delay"
    }
}
