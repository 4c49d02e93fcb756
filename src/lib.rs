#![warn(clippy::pedantic, clippy::nursery, clippy::cargo, clippy::perf)]

//! # `graphite_emitter`
//!
//! A buffered emitter that forwards metrics to a Graphite (Carbon) collector over the
//! plaintext TCP protocol.
//!
//! Producers push samples without ever blocking: each sample is formatted as
//! `prefix.metric value timestamp` at call time and placed on a bounded queue. A single
//! background drain loop wakes on a fixed interval, opens a fresh connection, writes
//! everything that is queued and closes the connection again. When the queue is full new
//! samples are dropped and a warning is logged through the [`log`] facade.
//!
//! ```no_run
//! use graphite_emitter::Emitter;
//! use std::time::Duration;
//!
//! let emitter = Emitter::new("127.0.0.1:2003", Duration::from_secs(10), "my.app", 1024)
//!     .expect("valid graphite address");
//! emitter.push_u64("requests", 42);
//! emitter.push_f64("load", 0.73);
//! ```
//!
//! ## Async Support
//!
//! Async support is available via the `tokio` feature flag. When enabled, the drain loop runs
//! as a Tokio task and emitters must be built from within a Tokio runtime. Enable with:
//!
//! ```toml
//! [dependencies]
//! graphite_emitter = { version = "...", features = ["tokio"] }
//! ```
//!
//! If the `tokio` feature is not enabled, the drain loop runs on its own thread and uses
//! blocking IO.
//!
//! ## `metrics` integration
//!
//! [`GraphiteRecorder`] implements [`metrics::Recorder`] so the `counter!`, `gauge!` and
//! `histogram!` macros can feed an [`Emitter`].

mod clock;
mod config;
mod drain;
mod emitter;
mod error;
mod recorder;
mod sample;
#[cfg(test)]
mod test_log;

pub use clock::{Clock, SystemClock};
pub use config::EmitterConfig;
pub use emitter::{
    DEFAULT_ADDRESS, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY, Emitter, EmitterBuilder,
};
pub use error::EmitterError;
pub use recorder::GraphiteRecorder;
