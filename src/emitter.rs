use crate::{
    clock::{Clock, SystemClock},
    drain::{self, Drain},
    error::EmitterError,
    recorder::GraphiteRecorder,
    sample::{Fixed4, Sample},
};
use std::{
    fmt,
    net::{SocketAddr, ToSocketAddrs},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
        mpsc::{self, Receiver, SyncSender, TrySendError},
    },
    time::Duration,
};

/// Carbon's plaintext listener on the local host.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:2003";

/// How often queued samples are written to the collector.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Number of samples held before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Sends metrics to Graphite.
///
/// Cloning an `Emitter` is cheap; every clone feeds the same queue and the same drain loop.
#[derive(Debug, Clone)]
pub struct Emitter {
    addr: SocketAddr,
    prefix: Arc<str>,
    pending: Arc<AtomicUsize>,
    sender: SyncSender<Sample>,
    clock: Arc<dyn Clock>,
}

impl Emitter {
    /// Creates an emitter for `address` and starts its drain loop.
    ///
    /// The address is resolved once, here. No connection is attempted until the first flush.
    ///
    /// # Errors
    /// Returns an error if `address` cannot be resolved, if `flush_interval` is zero, or if the
    /// drain loop cannot be started.
    pub fn new(
        address: &str,
        flush_interval: Duration,
        prefix: &str,
        queue_capacity: usize,
    ) -> Result<Self, EmitterError> {
        EmitterBuilder::default()
            .address(address)
            .flush_interval(flush_interval)
            .prefix(prefix)
            .queue_capacity(queue_capacity)
            .build()
    }

    fn with_queue(
        addr: SocketAddr,
        prefix: &str,
        clock: Arc<dyn Clock>,
        queue_capacity: usize,
    ) -> (Self, Receiver<Sample>) {
        let (sender, receiver) = mpsc::sync_channel(queue_capacity);
        let emitter = Self {
            addr,
            prefix: prefix.into(),
            pending: Arc::new(AtomicUsize::new(0)),
            sender,
            clock,
        };
        (emitter, receiver)
    }

    /// Queues an unsigned integer sample.
    pub fn push_u64(&self, metric: &str, value: u64) {
        self.enqueue(metric, value);
    }

    /// Queues a signed integer sample.
    pub fn push_i64(&self, metric: &str, value: i64) {
        self.enqueue(metric, value);
    }

    /// Queues a float sample, rendered with four digits after the decimal point.
    pub fn push_f64(&self, metric: &str, value: f64) {
        self.enqueue(metric, Fixed4(value));
    }

    /// Queues a pre-formatted value as is.
    pub fn push(&self, metric: &str, value: &str) {
        self.enqueue(metric, value);
    }

    fn enqueue(&self, metric: &str, value: impl fmt::Display) {
        let sample = Sample::new(&self.prefix, metric, value, self.clock.unix_timestamp());

        // Counted before the send so the drain loop never sees a queued sample it was not told about
        self.pending.fetch_add(1, Ordering::AcqRel);
        match self.sender.try_send(sample) {
            Ok(()) => {}
            Err(TrySendError::Full(sample)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                log::warn!("graphite buffer full, dropping {sample}");
            }
            Err(TrySendError::Disconnected(sample)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                log::error!("graphite drain loop has stopped, dropping {sample}");
            }
        }
    }

    /// Approximate number of samples waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// The resolved destination.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Routes the `metrics` macros to this emitter by installing a [`GraphiteRecorder`] as the
    /// global recorder.
    ///
    /// # Errors
    /// Returns an error if a global recorder is already installed.
    pub fn install_recorder(&self) -> Result<(), EmitterError> {
        GraphiteRecorder::new(self.clone()).install()
    }
}

#[derive(Debug)]
pub struct EmitterBuilder {
    address: String,
    flush_interval: Duration,
    prefix: String,
    queue_capacity: usize,
    clock: Arc<dyn Clock>,
}

impl Default for EmitterBuilder {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            prefix: String::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            clock: Arc::new(SystemClock),
        }
    }
}

impl EmitterBuilder {
    /// Sets the `host:port` of the Graphite plaintext listener.
    #[must_use]
    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    /// Sets how often queued samples are flushed.
    #[must_use]
    pub const fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Sets the prefix joined to every metric name with a `.`.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Sets how many samples may wait between flushes. With a capacity of zero every sample
    /// is dropped.
    #[must_use]
    pub const fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Replaces the clock used to timestamp samples.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Resolves the address and starts the drain loop.
    ///
    /// # Example
    /// ```no_run
    /// use graphite_emitter::EmitterBuilder;
    /// use std::time::Duration;
    ///
    /// let emitter = EmitterBuilder::default()
    ///     .address("graphite.internal:2003")
    ///     .flush_interval(Duration::from_secs(5))
    ///     .prefix("web01")
    ///     .build();
    /// if let Err(e) = emitter {
    ///     eprintln!("Failed to set up graphite emitter: {}", e);
    /// }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the address does not resolve, if the flush interval is zero, or if
    /// the drain loop cannot be spawned. With the `tokio` feature the builder must be called
    /// from within a Tokio runtime.
    pub fn build(self) -> Result<Emitter, EmitterError> {
        if self.flush_interval.is_zero() {
            return Err(EmitterError::InvalidInterval);
        }
        let addr = resolve(&self.address)?;

        let (emitter, receiver) =
            Emitter::with_queue(addr, &self.prefix, self.clock, self.queue_capacity);
        drain::spawn(Drain::new(
            addr,
            self.flush_interval,
            receiver,
            emitter.pending.clone(),
        ))?;

        log::debug!(
            "graphite emitter for {addr} flushing every {:?}",
            self.flush_interval
        );
        Ok(emitter)
    }
}

fn resolve(address: &str) -> Result<SocketAddr, EmitterError> {
    address
        .to_socket_addrs()
        .map_err(|source| EmitterError::Resolve {
            address: address.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| EmitterError::NoAddress(address.to_string()))
}
