//! Autocorrelation pitch estimator.
//!
//! For every lag in `[min_lag, max_lag)` the normalized autocorrelation
//!
//! ```text
//! R[lag] = 1/(N - lag) * Σ_{i=0}^{N-lag-1} x[i] * x[i + lag]
//! ```
//!
//! is computed and the largest value wins. The scan runs upwards and only a
//! strictly greater value replaces the current best, so on equal values the
//! shortest lag is kept. Detection reports a pitch when the winner's ratio to
//! the window energy `R0 = 1/N * Σ x[i]^2` exceeds the confidence threshold.
//!
//! Cost is O(N * (max_lag - min_lag)), so the engine only calls this once per
//! update cycle.

use crate::config::EngineConfig;
use crate::defaults;

/// Lag search range in samples, derived once from the session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagBounds {
    /// First lag evaluated (inclusive).
    pub min_lag: usize,
    /// End of the scan (exclusive).
    pub max_lag: usize,
}

impl LagBounds {
    /// `min_lag = floor(sr / max_hz)`, `max_lag = ceil(sr / min_hz)`, both
    /// clamped into `[2, window_size / 2]`.
    pub fn new(sample_rate: u32, min_hz: f64, max_hz: f64, window_size: usize) -> Self {
        let sr = sample_rate as f64;
        let upper = (window_size / 2).max(defaults::MIN_LAG);
        let clamp = |lag: f64| (lag.max(0.0) as usize).clamp(defaults::MIN_LAG, upper);

        Self {
            min_lag: clamp((sr / max_hz).floor()),
            max_lag: clamp((sr / min_hz).ceil()),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.sample_rate,
            config.min_frequency_hz,
            config.max_frequency_hz,
            config.window_size,
        )
    }

    /// Whether `lag` lies inside the searched range.
    pub fn contains(&self, lag: usize) -> bool {
        (self.min_lag..self.max_lag).contains(&lag)
    }

    /// Number of lags scanned per estimate.
    pub fn len(&self) -> usize {
        self.max_lag.saturating_sub(self.min_lag)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A successful detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Winning lag, i.e. the period in samples.
    pub lag: usize,
    /// `sample_rate / lag`.
    pub frequency_hz: f32,
    /// Peak autocorrelation over window energy.
    pub confidence: f32,
}

/// Detects the fundamental frequency of a window.
#[derive(Debug, Clone)]
pub struct PitchEstimator {
    sample_rate: u32,
    bounds: LagBounds,
    confidence_threshold: f64,
}

impl PitchEstimator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            bounds: LagBounds::from_config(config),
            confidence_threshold: config.confidence_threshold,
        }
    }

    pub fn bounds(&self) -> LagBounds {
        self.bounds
    }

    /// Returns the detected period, or `None` when no lag is convincing.
    pub fn estimate(&self, window: &[f32]) -> Option<PitchEstimate> {
        let n = window.len();
        // Bounds were derived for the configured window; never read past half
        // of a shorter one.
        let end = self.bounds.max_lag.min(n / 2);

        let mut best: Option<(usize, f64)> = None;
        for lag in self.bounds.min_lag..end {
            let r = autocorrelation(window, lag);
            match best {
                Some((_, best_r)) if r <= best_r => {}
                _ => best = Some((lag, r)),
            }
        }

        let (lag, max_r) = best?;
        let r0 = energy(window);
        let confidence = if r0 > 0.0 { max_r / r0 } else { 0.0 };

        if confidence > self.confidence_threshold && self.bounds.contains(lag) {
            Some(PitchEstimate {
                lag,
                frequency_hz: self.sample_rate as f32 / lag as f32,
                confidence: confidence as f32,
            })
        } else {
            None
        }
    }
}

/// Normalized autocorrelation of `x` at `lag`; 0.0 when `lag >= x.len()`.
pub fn autocorrelation(x: &[f32], lag: usize) -> f64 {
    if lag >= x.len() {
        return 0.0;
    }
    let m = x.len() - lag;
    let sum: f64 = x[..m]
        .iter()
        .zip(&x[lag..])
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum();
    sum / m as f64
}

/// Mean energy `1/N * Σ x^2` (the zero-lag autocorrelation).
pub fn energy(x: &[f32]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let sum: f64 = x.iter().map(|&s| s as f64 * s as f64).sum();
    sum / x.len() as f64
}
