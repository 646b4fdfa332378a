//! prosody - real-time voice prosody extraction
//!
//! Turns a live stream of mono sample blocks into ~10 records per second of
//! pitch, jitter and shimmer, with a silence gate in front.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
#[cfg(feature = "cli")]
pub mod output;

// Core types (blocks → engine → sink)
pub use audio::BlockSource;
pub use engine::{AudioBlock, ProsodyEngine, RecordSink};

// Records
pub use engine::{CycleOutcome, ProsodyMetrics, ProsodyRecord};

// Threaded hosting
pub use engine::{EngineSession, SessionSummary};

// Error handling
pub use error::{ProsodyError, Result};

// Config
pub use config::{Config, EngineConfig, OutputConfig, OutputFormat};

// Station framework (for advanced users)
pub use engine::{ErrorReporter, Station, StationError, StationRunner};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
