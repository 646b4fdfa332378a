//! Record sinks: where emitted prosody records go.
//!
//! The engine pushes one record per cycle and never waits on the consumer.

use crate::engine::record::ProsodyRecord;
use crate::error::{ProsodyError, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::io::Write;

/// Destination for emitted records.
pub trait RecordSink: Send + 'static {
    /// Handle one record. Must not block.
    fn handle(&mut self, record: &ProsodyRecord) -> Result<()>;

    /// Called when the engine is torn down.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

impl RecordSink for Box<dyn RecordSink> {
    fn handle(&mut self, record: &ProsodyRecord) -> Result<()> {
        (**self).handle(record)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Pushes records onto a bounded channel without blocking.
///
/// A full channel drops the record: the consumer gets the next one instead.
pub struct ChannelSink {
    tx: Sender<ProsodyRecord>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProsodyRecord>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Creates a sink and the receiving end for the consumer.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ProsodyRecord>) {
        let (tx, rx) = bounded(capacity);
        (Self::new(tx), rx)
    }

    /// Records discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl RecordSink for ChannelSink {
    fn handle(&mut self, record: &ProsodyRecord) -> Result<()> {
        match self.tx.try_send(*record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::trace!(dropped = self.dropped, "record channel full, dropping record");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(ProsodyError::ChannelClosed {
                sink: self.name().to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct CollectorSink {
    records: Vec<ProsodyRecord>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ProsodyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProsodyRecord> {
        self.records
    }
}

impl RecordSink for CollectorSink {
    fn handle(&mut self, record: &ProsodyRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Writes each record as one JSON object per line.
///
/// Intended for offline runs (files, pipes); performs I/O on every record.
pub struct JsonLinesSink<W: Write + Send + 'static> {
    writer: W,
}

impl<W: Write + Send + 'static> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> RecordSink for JsonLinesSink<W> {
    fn handle(&mut self, record: &ProsodyRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json-lines"
    }
}
