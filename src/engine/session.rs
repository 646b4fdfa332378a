//! Threaded engine session.
//!
//! The producer side stands in for the host's audio callback: it hands blocks
//! over with `try_send` and never waits. The engine runs on its own thread and
//! publishes records on a bounded channel the consumer polls.
//!
//! This is a host-side helper for offline drivers and tests. A real-time
//! audio callback should own a `ProsodyEngine` directly and call
//! `process_block`, which only touches preallocated buffers.

use crate::config::{Config, EngineConfig};
use crate::defaults;
use crate::engine::error::ErrorReporter;
use crate::engine::processor::{AudioBlock, ProsodyEngine};
use crate::engine::record::ProsodyRecord;
use crate::engine::scheduler::EmissionStats;
use crate::engine::sink::ChannelSink;
use crate::engine::station::StationRunner;
use crate::error::{ProsodyError, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;

/// What a session did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Blocks handed to the engine thread.
    pub blocks_sent: u64,
    /// Blocks discarded because the engine thread fell behind.
    pub blocks_dropped: u64,
    /// Records discarded because the consumer fell behind.
    pub records_dropped: u64,
    pub stats: EmissionStats,
}

/// Handle to a running engine thread.
pub struct EngineSession {
    block_tx: Option<Sender<AudioBlock>>,
    records: Receiver<ProsodyRecord>,
    runner: Option<StationRunner<ProsodyEngine<ChannelSink>>>,
    next_sequence: u64,
    blocks_dropped: u64,
}

impl EngineSession {
    /// Starts an engine thread for `config`.
    ///
    /// `record_capacity` bounds the record channel; when the consumer lags,
    /// newer records are dropped rather than stalling the engine.
    pub fn start(
        config: EngineConfig,
        record_capacity: usize,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        let (sink, records) = ChannelSink::bounded(record_capacity.max(1));
        let engine = ProsodyEngine::new(config, sink)?;
        let (block_tx, block_rx) = bounded(defaults::BLOCK_CHANNEL_CAPACITY);
        let runner = StationRunner::spawn(engine, block_rx, error_reporter);

        Ok(Self {
            block_tx: Some(block_tx),
            records,
            runner: Some(runner),
            next_sequence: 0,
            blocks_dropped: 0,
        })
    }

    /// Starts an engine thread with the record channel sized by
    /// `config.output.channel_capacity`.
    pub fn from_config(config: &Config, error_reporter: Arc<dyn ErrorReporter>) -> Result<Self> {
        Self::start(
            config.engine.clone(),
            config.output.channel_capacity,
            error_reporter,
        )
    }

    /// Copies one block to the engine. Returns false if it had to be dropped.
    pub fn push(&mut self, samples: &[f32]) -> bool {
        self.push_owned(samples.to_vec())
    }

    /// Hands an owned block to the engine without copying it.
    pub fn push_owned(&mut self, samples: Vec<f32>) -> bool {
        let block = AudioBlock::new(self.next_sequence, samples);
        self.send(block)
    }

    /// Signals a callback that fired without input.
    pub fn push_missing(&mut self) -> bool {
        let block = AudioBlock::missing(self.next_sequence);
        self.send(block)
    }

    fn send(&mut self, block: AudioBlock) -> bool {
        self.next_sequence += 1;
        let Some(tx) = &self.block_tx else {
            return false;
        };
        match tx.try_send(block) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.blocks_dropped += 1;
                tracing::trace!(dropped = self.blocks_dropped, "engine behind, dropping block");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.blocks_dropped += 1;
                false
            }
        }
    }

    /// Next record, if one is ready.
    pub fn try_recv(&self) -> Option<ProsodyRecord> {
        self.records.try_recv().ok()
    }

    /// A receiver for emitted records; stays readable after `stop`.
    pub fn records(&self) -> Receiver<ProsodyRecord> {
        self.records.clone()
    }

    /// True while the engine thread is alive.
    pub fn is_running(&self) -> bool {
        self.runner.as_ref().is_some_and(|r| !r.is_finished())
    }

    /// Stops accepting blocks, lets the engine drain what is queued, and
    /// joins its thread.
    pub fn stop(mut self) -> Result<SessionSummary> {
        self.block_tx.take();
        let runner = self
            .runner
            .take()
            .ok_or_else(|| ProsodyError::Other("engine session already stopped".to_string()))?;
        let engine = runner.join().map_err(ProsodyError::Other)?;

        let summary = SessionSummary {
            blocks_sent: self.next_sequence - self.blocks_dropped,
            blocks_dropped: self.blocks_dropped,
            records_dropped: engine.sink().dropped(),
            stats: engine.stats(),
        };
        tracing::debug!(?summary, "engine session stopped");
        Ok(summary)
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.block_tx.take();
        if let Some(runner) = self.runner.take()
            && let Err(e) = runner.join()
        {
            tracing::error!("{}", e);
        }
    }
}
