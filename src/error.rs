use crate::recorder::GraphiteRecorder;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitterError {
    #[error("IO error starting graphite emitter {0}")]
    Io(#[from] std::io::Error),
    #[error("couldnt resolve graphite address {address}: {source}")]
    Resolve {
        address: String,
        source: std::io::Error,
    },
    #[error("graphite address {0} did not resolve to any socket address")]
    NoAddress(String),
    #[error("flush interval must be greater than zero")]
    InvalidInterval,
    #[cfg(feature = "tokio")]
    #[error("graphite emitter must be built inside a Tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("failed to set GraphiteRecorder: {0}")]
    Recorder(#[from] metrics::SetRecorderError<GraphiteRecorder>),
}
