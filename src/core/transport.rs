//! Transport trait and the options passed to every invocation

use super::error::Result;
use super::record::LogRecord;
use super::timestamp::Clock;
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A log sink
///
/// The scheduler calls `deliver` once per record, concurrently with every
/// other transport. Implementations that need their writes to stay in call
/// order await [`TransportOptions::transport_ready`] before their side effect;
/// implementations with no ordering needs ignore it.
///
/// # Example
///
/// ```no_run
/// use transport_logger::core::{LogRecord, Result, Transport, TransportOptions};
/// use async_trait::async_trait;
///
/// struct Stdout;
///
/// #[async_trait]
/// impl Transport for Stdout {
///     async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
///         options.transport_ready.await;
///         println!("{}", record.output());
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "stdout"
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()>;

    fn name(&self) -> &str;
}

/// Per-invocation context handed to a transport
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Minimum rank the transport should act on. Advisory.
    pub threshold: i32,
    /// Resolves once every invocation of the previous log call has settled
    pub ready: ReadySignal,
    /// Resolves once this transport's previous invocation has settled
    pub transport_ready: ReadySignal,
    /// Logger name, if configured
    pub name: Option<String>,
    /// Root folder for file based transports
    pub log_folder: PathBuf,
    /// Time zone for dates derived from record timestamps
    pub clock: Clock,
}

/// A cloneable completion signal that never fails
///
/// Awaiting it yields `()` once the work it tracks has settled, whatever the
/// outcome of that work.
#[derive(Clone)]
pub struct ReadySignal(Shared<BoxFuture<'static, ()>>);

impl ReadySignal {
    /// A signal that is already settled
    pub fn resolved() -> Self {
        Self(future::ready(()).boxed().shared())
    }

    /// Settles when `future` does
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future + Send + 'static,
    {
        Self(future.map(|_| ()).boxed().shared())
    }

    /// Settles once every future in `futures` has
    pub fn join_all<I, F>(futures: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Future + Send + 'static,
        F::Output: Send,
    {
        Self::from_future(future::join_all(futures))
    }

    /// Whether the tracked work has already settled, without blocking
    pub fn is_ready(&self) -> bool {
        self.0.peek().is_some() || self.0.clone().now_or_never().is_some()
    }

    /// Block the current thread until the signal resolves
    ///
    /// Must not be called from inside the runtime driving the tracked work.
    pub fn wait(&self) {
        futures::executor::block_on(self.clone());
    }
}

impl Future for ReadySignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.0.poll_unpin(cx)
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySignal")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Adapts a synchronous closure into a [`Transport`]
pub struct FnTransport<F> {
    name: String,
    func: F,
}

impl<F> FnTransport<F>
where
    F: Fn(&LogRecord, &TransportOptions) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F> Transport for FnTransport<F>
where
    F: Fn(&LogRecord, &TransportOptions) -> Result<()> + Send + Sync,
{
    async fn deliver(&self, record: &LogRecord, options: TransportOptions) -> Result<()> {
        (self.func)(record, &options)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shorthand for [`FnTransport::new`]
pub fn transport_fn<F>(name: impl Into<String>, func: F) -> FnTransport<F>
where
    F: Fn(&LogRecord, &TransportOptions) -> Result<()> + Send + Sync,
{
    FnTransport::new(name, func)
}
