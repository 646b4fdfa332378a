//! Loudness gate for the analysis window.
//!
//! Computes RMS over the whole window, converts it to dBFS and compares
//! against a fixed threshold. The decision depends only on the current window.

use crate::defaults;

/// Loudness of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loudness {
    /// Root-mean-square amplitude.
    pub rms: f32,
    /// `20 * log10(rms + ε)`; finite even for digital silence.
    pub db: f32,
    /// True when `db` is below the classifier threshold.
    pub is_silent: bool,
}

/// Classifies windows as silent or voiced by level.
#[derive(Debug, Clone, Copy)]
pub struct SilenceClassifier {
    threshold_db: f64,
}

impl SilenceClassifier {
    pub fn new(threshold_db: f64) -> Self {
        Self { threshold_db }
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    /// Measures the window and applies the threshold.
    pub fn classify(&self, window: &[f32]) -> Loudness {
        let rms = calculate_rms(window);
        let db = rms_to_db(rms);
        Loudness {
            rms,
            db,
            is_silent: (db as f64) < self.threshold_db,
        }
    }
}

impl Default for SilenceClassifier {
    fn default() -> Self {
        Self::new(defaults::SILENCE_THRESHOLD_DB)
    }
}

/// Root-mean-square of `samples`; 0.0 for an empty slice.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let s = sample as f64;
            s * s
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

/// Converts an RMS amplitude to dBFS, offset by a small epsilon.
pub fn rms_to_db(rms: f32) -> f32 {
    20.0 * (rms + defaults::DB_EPSILON).log10()
}
