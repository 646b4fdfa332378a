//! WAV file audio source for offline analysis.

use crate::audio::source::BlockSource;
use crate::defaults::BLOCK_LENGTH;
use crate::error::{ProsodyError, Result};
use std::io::Read;
use std::path::Path;

/// Audio source that reads a whole WAV file up front.
/// Supports integer and float PCM with any channel count; the result is
/// down-mixed to mono f32 at the file's own sample rate.
pub struct WavBlockSource {
    samples: Vec<f32>,
    sample_rate: u32,
    position: usize,
    block_length: usize,
}

impl WavBlockSource {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let wav_reader = hound::WavReader::new(reader).map_err(|e| ProsodyError::AudioInput {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();
        if spec.channels == 0 {
            return Err(ProsodyError::AudioFormat {
                message: "WAV file declares zero channels".to_string(),
            });
        }

        let interleaved = read_normalized(wav_reader, spec)?;
        let samples = downmix(&interleaved, spec.channels as usize);

        tracing::debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            frames = samples.len(),
            "decoded WAV input"
        );

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            position: 0,
            block_length: BLOCK_LENGTH,
        })
    }

    /// Open a WAV file on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| ProsodyError::AudioInput {
            message: format!("Failed to open {}: {}", path.display(), e),
        })?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)))
    }

    /// Create from stdin.
    pub fn from_stdin() -> Result<Self> {
        use std::io::Cursor;

        // Read all data from stdin into memory first (StdinLock is not Send)
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|e| ProsodyError::AudioInput {
                message: format!("Failed to read from stdin: {}", e),
            })?;

        Self::from_reader(Box::new(Cursor::new(buffer)))
    }

    /// Overrides the block length (defaults to the host quantum).
    pub fn with_block_length(mut self, block_length: usize) -> Self {
        self.block_length = block_length.max(1);
        self
    }

    /// Mono samples decoded from the file.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Length of the decoded audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

impl BlockSource for WavBlockSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn block_length(&self) -> usize {
        self.block_length
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = std::cmp::min(self.position + self.block_length, self.samples.len());
        let mut block = self.samples[self.position..end].to_vec();
        block.resize(self.block_length, 0.0);
        self.position = end;

        Ok(Some(block))
    }
}

/// Reads every sample as f32 in [-1, 1], still interleaved.
fn read_normalized<R: Read>(
    mut reader: hound::WavReader<R>,
    spec: hound::WavSpec,
) -> Result<Vec<f32>> {
    let read_err = |e: hound::Error| ProsodyError::AudioInput {
        message: format!("Failed to read WAV samples: {}", e),
    };

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err),
        (hound::SampleFormat::Int, bits @ 1..=32) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(read_err)
        }
        (format, bits) => Err(ProsodyError::AudioFormat {
            message: format!("{:?} samples with {} bits", format, bits),
        }),
    }
}

/// Averages interleaved frames down to one channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
