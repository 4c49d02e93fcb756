use crate::{error::EmitterError, sample::Sample};
#[cfg(not(feature = "tokio"))]
use std::{
    io::Write,
    net::{Shutdown, TcpStream},
    thread,
    time::Instant,
};
use std::{
    io,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
        mpsc::Receiver,
    },
    time::Duration,
};
#[cfg(feature = "tokio")]
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    runtime::Handle,
    time::{self, MissedTickBehavior},
};

/// The consuming side of an emitter: owns the queue receiver and, during a flush, the
/// connection.
pub struct Drain {
    addr: SocketAddr,
    interval: Duration,
    receiver: Receiver<Sample>,
    pending: Arc<AtomicUsize>,
}

impl Drain {
    pub const fn new(
        addr: SocketAddr,
        interval: Duration,
        receiver: Receiver<Sample>,
        pending: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            addr,
            interval,
            receiver,
            pending,
        }
    }

    fn is_idle(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    // Empty and disconnected both mean there is nothing left to send this tick
    fn next_sample(&self) -> Option<Sample> {
        let sample = self.receiver.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(sample)
    }

    fn report(&self, flushed: io::Result<usize>) {
        match flushed {
            Ok(sent) => log::debug!("sent {sent} samples to graphite at {}", self.addr),
            Err(e) => log::error!("graphite push error: {e}"),
        }
    }
}

#[cfg(not(feature = "tokio"))]
pub fn spawn(drain: Drain) -> Result<(), EmitterError> {
    thread::Builder::new()
        .name("graphite-emitter".into())
        .spawn(move || drain.run())?;
    Ok(())
}

#[cfg(not(feature = "tokio"))]
impl Drain {
    fn run(self) {
        let mut next_tick = Instant::now() + self.interval;
        loop {
            thread::sleep(next_tick.saturating_duration_since(Instant::now()));
            self.tick();

            // Ticks missed during a slow flush are skipped, not replayed
            next_tick += self.interval;
            let now = Instant::now();
            while next_tick <= now {
                next_tick += self.interval;
            }
        }
    }

    fn tick(&self) {
        if self.is_idle() {
            log::trace!("nothing queued for graphite, skipping flush");
            return;
        }
        self.report(self.flush());
    }

    fn flush(&self) -> io::Result<usize> {
        let stream = TcpStream::connect(self.addr)?;
        let written = self.write_pending(&stream);
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            log::error!("Error closing TCP connection to graphite: {e}");
        }
        written
    }

    fn write_pending(&self, mut out: impl Write) -> io::Result<usize> {
        let mut sent = 0;
        while let Some(sample) = self.next_sample() {
            out.write_all(sample.as_bytes())?;
            out.flush()?;
            sent += 1;
        }
        Ok(sent)
    }
}

#[cfg(feature = "tokio")]
pub fn spawn(drain: Drain) -> Result<(), EmitterError> {
    Handle::try_current()?.spawn(drain.run());
    Ok(())
}

#[cfg(feature = "tokio")]
impl Drain {
    async fn run(mut self) {
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        // Ticks missed during a slow flush are skipped, not replayed
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&mut self) {
        if self.is_idle() {
            log::trace!("nothing queued for graphite, skipping flush");
            return;
        }
        let flushed = self.flush().await;
        self.report(flushed);
    }

    async fn flush(&mut self) -> io::Result<usize> {
        let mut stream = TcpStream::connect(self.addr).await?;
        let written = self.write_pending(&mut stream).await;
        if let Err(e) = stream.shutdown().await {
            log::error!("Error closing TCP connection to graphite: {e}");
        }
        written
    }

    async fn write_pending(&mut self, out: &mut (impl AsyncWrite + Unpin)) -> io::Result<usize> {
        let mut sent = 0;
        while let Some(sample) = self.next_sample() {
            out.write_all(sample.as_bytes()).await?;
            out.flush().await?;
            sent += 1;
        }
        Ok(sent)
    }
}
