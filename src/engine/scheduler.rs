//! Update cadence and record emission.
//!
//! Counts host blocks and fires one analysis cycle every `frames_per_update`
//! blocks, then pushes the cycle's record to the sink exactly once.

use crate::engine::record::CycleOutcome;
use crate::engine::sink::RecordSink;

/// Counters describing what the scheduler has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmissionStats {
    /// Cycles run (one per `frames_per_update` blocks).
    pub cycles: u64,
    /// Records accepted by the sink.
    pub emitted: u64,
    /// Records the sink refused.
    pub failed: u64,
}

/// Rate-limits analysis to a fixed cadence and forwards records downstream.
pub struct OutputScheduler<S: RecordSink> {
    frames_per_update: usize,
    frame_count: usize,
    sink: S,
    stats: EmissionStats,
    sink_closed: bool,
}

impl<S: RecordSink> OutputScheduler<S> {
    pub fn new(frames_per_update: usize, sink: S) -> Self {
        Self {
            frames_per_update: frames_per_update.max(1),
            frame_count: 0,
            sink,
            stats: EmissionStats::default(),
            sink_closed: false,
        }
    }

    /// Counts one host block. Returns true when a cycle is due; the counter
    /// is reset at that point.
    pub fn tick(&mut self) -> bool {
        self.frame_count += 1;
        if self.frame_count >= self.frames_per_update {
            self.frame_count = 0;
            self.stats.cycles += 1;
            true
        } else {
            false
        }
    }

    /// Pushes the record for `outcome`. Never blocks; sink failures are
    /// counted and the first one is logged.
    pub fn emit(&mut self, outcome: &CycleOutcome) {
        match self.sink.handle(&outcome.to_record()) {
            Ok(()) => self.stats.emitted += 1,
            Err(e) => {
                self.stats.failed += 1;
                if !self.sink_closed {
                    tracing::warn!(sink = self.sink.name(), error = %e, "record sink refused output");
                    self.sink_closed = true;
                }
            }
        }
    }

    pub fn frames_per_update(&self) -> usize {
        self.frames_per_update
    }

    /// Blocks counted since the last cycle.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn stats(&self) -> EmissionStats {
        self.stats
    }

    /// True once the sink has refused a record.
    pub fn is_sink_closed(&self) -> bool {
        self.sink_closed
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
