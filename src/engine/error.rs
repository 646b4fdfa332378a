//! Error types and reporting for hosted stations.

use thiserror::Error;

/// Errors a station hands back to its runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    /// The input was processed but looked wrong; the station keeps running.
    #[error("degraded input: {0}")]
    Recoverable(String),
    /// The station cannot make progress and shuts down.
    #[error("station halted: {0}")]
    Fatal(String),
}

impl StationError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StationError::Fatal(_))
    }
}

/// Receives every error a runner sees.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, station: &str, error: &StationError);
}

/// Reporter that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        if error.is_fatal() {
            tracing::error!(station, %error, "station failed");
        } else {
            tracing::warn!(station, %error, "station reported a problem");
        }
    }
}
