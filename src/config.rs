use crate::emitter::{
    DEFAULT_ADDRESS, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY, EmitterBuilder,
};
use serde::Deserialize;
use std::time::Duration;

/// Emitter settings as they appear in an application's configuration file.
///
/// Every field is optional and falls back to the builder defaults.
///
/// ```
/// # fn main() -> Result<(), serde_json::Error> {
/// let config: graphite_emitter::EmitterConfig =
///     serde_json::from_str(r#"{ "address": "graphite:2003", "prefix": "web01" }"#)?;
/// let builder = graphite_emitter::EmitterBuilder::from(config);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub address: String,
    pub flush_interval_ms: u64,
    pub prefix: String,
    pub queue_capacity: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            flush_interval_ms: u64::try_from(DEFAULT_FLUSH_INTERVAL.as_millis())
                .unwrap_or(u64::MAX),
            prefix: String::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl From<EmitterConfig> for EmitterBuilder {
    fn from(config: EmitterConfig) -> Self {
        Self::default()
            .address(&config.address)
            .flush_interval(Duration::from_millis(config.flush_interval_ms))
            .prefix(&config.prefix)
            .queue_capacity(config.queue_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: EmitterConfig = serde_json::from_str(r#"{ "prefix": "web01" }"#).unwrap();
        assert_eq!(
            config,
            EmitterConfig {
                prefix: "web01".into(),
                ..EmitterConfig::default()
            }
        );
        assert_eq!(config.address, "127.0.0.1:2003");
        assert_eq!(config.flush_interval_ms, 10_000);
        assert_eq!(config.queue_capacity, 1024);
    }

    #[test]
    fn full_config() {
        let config: EmitterConfig = serde_json::from_str(
            r#"{
                "address": "graphite.internal:2003",
                "flush_interval_ms": 250,
                "prefix": "svc",
                "queue_capacity": 16
            }"#,
        )
        .unwrap();
        assert_eq!(config.address, "graphite.internal:2003");
        assert_eq!(config.flush_interval_ms, 250);
        assert_eq!(config.queue_capacity, 16);
    }

    #[test]
    fn zero_interval_from_config_fails_to_build() {
        let config = EmitterConfig {
            flush_interval_ms: 0,
            ..EmitterConfig::default()
        };
        assert!(EmitterBuilder::from(config).build().is_err());
    }
}
