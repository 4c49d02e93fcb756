use crate::{emitter::Emitter, error::EmitterError};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Write,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// Renders a key as a Graphite path, with labels in tagged-series form: `name;k1=v1;k2=v2`.
fn metric_path(key: &metrics::Key) -> String {
    let labels = key
        .labels()
        .map(|label| (label.key(), label.value()))
        .collect::<BTreeMap<_, _>>();

    let mut path = key.name().to_string();
    for (k, v) in labels {
        let _ = write!(path, ";{k}={v}");
    }
    path
}

#[derive(Debug)]
struct Handle {
    path: String,
    emitter: Emitter,
    // running total for counters, f64 bits for gauges
    value: AtomicU64,
}

impl Handle {
    fn new(key: &metrics::Key, emitter: Emitter) -> Self {
        Self {
            path: metric_path(key),
            emitter,
            value: AtomicU64::new(0),
        }
    }

    fn update_gauge(&self, op: impl Fn(f64) -> f64) {
        let mut current = 0.0;
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                current = op(f64::from_bits(bits));
                Some(current.to_bits())
            });
        self.emitter.push_f64(&self.path, current);
    }
}

impl metrics::CounterFn for Handle {
    fn increment(&self, value: u64) {
        let total = self
            .value
            .fetch_add(value, Ordering::AcqRel)
            .wrapping_add(value);
        self.emitter.push_u64(&self.path, total);
    }

    fn absolute(&self, value: u64) {
        let total = self.value.fetch_max(value, Ordering::AcqRel).max(value);
        self.emitter.push_u64(&self.path, total);
    }
}

impl metrics::GaugeFn for Handle {
    fn increment(&self, value: f64) {
        self.update_gauge(|current| current + value);
    }

    fn decrement(&self, value: f64) {
        self.update_gauge(|current| current - value);
    }

    fn set(&self, value: f64) {
        self.update_gauge(|_| value);
    }
}

impl metrics::HistogramFn for Handle {
    fn record(&self, value: f64) {
        self.emitter.push_f64(&self.path, value);
    }
}

type Handles = Mutex<HashMap<metrics::Key, Arc<Handle>>>;

/// A [`metrics::Recorder`] that writes every update to an [`Emitter`].
///
/// Counters are sent as running totals and gauges as their current value. Histograms have no
/// aggregation step: each recorded value becomes one sample.
#[derive(Debug)]
pub struct GraphiteRecorder {
    emitter: Emitter,
    counters: Handles,
    gauges: Handles,
}

impl GraphiteRecorder {
    #[must_use]
    pub fn new(emitter: Emitter) -> Self {
        Self {
            emitter,
            counters: Mutex::default(),
            gauges: Mutex::default(),
        }
    }

    /// Sets this recorder as the global recorder.
    ///
    /// # Example
    /// ```no_run
    /// use graphite_emitter::{Emitter, GraphiteRecorder};
    /// use std::time::Duration;
    ///
    /// let emitter = Emitter::new("127.0.0.1:2003", Duration::from_secs(10), "my.app", 1024).unwrap();
    /// if let Err(e) = GraphiteRecorder::new(emitter).install() {
    ///     eprintln!("Failed to set up graphite recorder: {}", e);
    /// }
    /// metrics::counter!("requests").increment(1);
    /// ```
    ///
    /// # Errors
    /// Returns an error if a global recorder has already been set.
    pub fn install(self) -> Result<(), EmitterError> {
        metrics::set_global_recorder(self).map_err(Into::into)
    }

    // Stateful handles are shared so every call site sees the same total
    fn handle(&self, handles: &Handles, key: &metrics::Key) -> Arc<Handle> {
        let mut handles = handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Handle::new(key, self.emitter.clone())))
            .clone()
    }
}

impl metrics::Recorder for GraphiteRecorder {
    fn describe_counter(
        &self,
        key_name: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        _description: metrics::SharedString,
    ) {
        log::trace!("graphite has no metadata, ignoring description of {key_name:?}");
    }

    fn describe_gauge(
        &self,
        key_name: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        _description: metrics::SharedString,
    ) {
        log::trace!("graphite has no metadata, ignoring description of {key_name:?}");
    }

    fn describe_histogram(
        &self,
        key_name: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        _description: metrics::SharedString,
    ) {
        log::trace!("graphite has no metadata, ignoring description of {key_name:?}");
    }

    fn register_counter(
        &self,
        key: &metrics::Key,
        _meta: &metrics::Metadata<'_>,
    ) -> metrics::Counter {
        metrics::Counter::from_arc(self.handle(&self.counters, key))
    }

    fn register_gauge(&self, key: &metrics::Key, _meta: &metrics::Metadata<'_>) -> metrics::Gauge {
        metrics::Gauge::from_arc(self.handle(&self.gauges, key))
    }

    fn register_histogram(
        &self,
        key: &metrics::Key,
        _meta: &metrics::Metadata<'_>,
    ) -> metrics::Histogram {
        metrics::Histogram::from_arc(Arc::new(Handle::new(key, self.emitter.clone())))
    }
}
