//! Engine: per-block entry point, cadence, record emission and threading.

pub mod error;
pub mod processor;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod sink;
pub mod station;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use processor::{AudioBlock, ProsodyEngine};
pub use record::{CycleOutcome, ProsodyMetrics, ProsodyRecord};
pub use scheduler::{EmissionStats, OutputScheduler};
pub use session::{EngineSession, SessionSummary};
pub use sink::{ChannelSink, CollectorSink, JsonLinesSink, RecordSink};
pub use station::{Station, StationRunner};
