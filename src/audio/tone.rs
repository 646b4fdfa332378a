//! Synthetic sine source for demos, benchmarks and tests.

use crate::audio::source::BlockSource;
use crate::error::Result;
use std::f64::consts::PI;

/// Phase-continuous sine generator producing host-sized blocks.
///
/// Sample `n` of the stream is `amplitude * sin(2π·f·n / sr)`, computed in
/// f64 from the absolute sample index so consecutive blocks line up exactly.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    frequency_hz: f64,
    amplitude: f32,
    sample_rate: u32,
    block_length: usize,
    position: u64,
    /// Total samples to produce; `None` runs forever.
    limit: Option<u64>,
}

impl ToneGenerator {
    pub fn new(frequency_hz: f64, amplitude: f32, sample_rate: u32, block_length: usize) -> Self {
        Self {
            frequency_hz,
            amplitude,
            sample_rate,
            block_length: block_length.max(1),
            position: 0,
            limit: None,
        }
    }

    /// Stops after `seconds` of audio (rounded up to whole blocks).
    pub fn with_duration(mut self, seconds: f64) -> Self {
        let samples = (seconds.max(0.0) * self.sample_rate as f64).ceil() as u64;
        self.limit = Some(samples);
        self
    }

    /// Stops after exactly `blocks` blocks.
    pub fn with_block_limit(mut self, blocks: u64) -> Self {
        self.limit = Some(blocks * self.block_length as u64);
        self
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Absolute index of the next sample to be generated.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Value of sample `n` of the stream.
    pub fn sample_at(&self, n: u64) -> f32 {
        let phase = 2.0 * PI * self.frequency_hz * n as f64 / self.sample_rate as f64;
        (self.amplitude as f64 * phase.sin()) as f32
    }

    /// Fills `out` with the next samples.
    pub fn fill(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.sample_at(self.position);
            self.position += 1;
        }
    }

    /// Next block, ignoring any duration limit.
    pub fn block(&mut self) -> Vec<f32> {
        let mut block = vec![0.0; self.block_length];
        self.fill(&mut block);
        block
    }
}

impl BlockSource for ToneGenerator {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn block_length(&self) -> usize {
        self.block_length
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        if let Some(limit) = self.limit
            && self.position >= limit
        {
            return Ok(None);
        }
        Ok(Some(self.block()))
    }
}
