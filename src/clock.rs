use std::{
    fmt::Debug,
    time::{SystemTime, UNIX_EPOCH},
};

/// Source of the timestamp stamped on every sample.
///
/// Samples are timestamped when they are pushed, not when they are sent, so the value
/// reflects when the measurement was observed.
pub trait Clock: Debug + Send + Sync {
    /// Seconds since the Unix epoch.
    fn unix_timestamp(&self) -> u64;
}

/// Wall-clock time from [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        // A clock set before 1970 is reported as the epoch itself
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}
