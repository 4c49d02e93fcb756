use std::fmt;

/// A single plaintext protocol line, `prefix.metric value timestamp\n`.
///
/// The value is rendered when the sample is built so the queue only ever carries text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample(String);

impl Sample {
    pub fn new(prefix: &str, metric: &str, value: impl fmt::Display, timestamp: u64) -> Self {
        Self(format!("{prefix}.{metric} {value} {timestamp}\n"))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim_end())
    }
}

/// Floats are always sent with four fractional digits.
pub struct Fixed4(pub f64);

impl fmt::Display for Fixed4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
