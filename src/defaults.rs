//! Default configuration constants for prosody.
//!
//! Shared by `EngineConfig`, the CLI and the test helpers so every entry point
//! agrees on the same session parameters.

/// Default host sample rate in Hz.
///
/// Matches the common 48kHz rate of browser and desktop audio graphs.
pub const SAMPLE_RATE: u32 = 48000;

/// Default number of samples per host block.
///
/// 128 is the render quantum of most real-time audio hosts.
pub const BLOCK_LENGTH: usize = 128;

/// Default analysis window (ring buffer) size in samples.
///
/// At 48kHz this is ~43ms, enough for at least two periods of a 50Hz voice.
pub const WINDOW_SIZE: usize = 2048;

/// Default number of successful detections kept for jitter/shimmer.
pub const HISTORY_CAPACITY: usize = 50;

/// Lowest fundamental frequency searched, in Hz.
pub const MIN_FREQUENCY_HZ: f64 = 50.0;

/// Highest fundamental frequency searched, in Hz.
pub const MAX_FREQUENCY_HZ: f64 = 400.0;

/// Windows quieter than this (dBFS) are classified as silence.
pub const SILENCE_THRESHOLD_DB: f64 = -50.0;

/// Target number of records emitted per second.
pub const UPDATE_RATE_HZ: f64 = 10.0;

/// Minimum ratio of peak autocorrelation to signal energy for a detection.
pub const CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Added to the RMS before taking the logarithm so silence stays finite.
pub const DB_EPSILON: f32 = 1e-10;

/// Smallest autocorrelation lag the pitch search will ever evaluate.
pub const MIN_LAG: usize = 2;

/// Default capacity of the record channel between engine and consumer.
///
/// At 10 records/s this holds ten seconds of output before records are dropped.
pub const RECORD_CHANNEL_CAPACITY: usize = 100;

/// Default capacity of the block channel feeding a hosted engine thread.
pub const BLOCK_CHANNEL_CAPACITY: usize = 1024;
