//! Jitter and shimmer over the detection history.
//!
//! Both are the mean absolute difference between consecutive entries, in raw
//! units: samples for jitter, amplitude for shimmer. No normalization by the
//! mean period or amplitude is applied.

use crate::analysis::history::ProsodyHistory;

/// Cycle-to-cycle variability of the current history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Variability {
    /// Mean |period_i - period_{i+1}| in samples.
    pub jitter: f32,
    /// Mean |amplitude_i - amplitude_{i+1}|.
    pub shimmer: f32,
}

/// Computes jitter and shimmer; both are zero with fewer than two entries.
pub fn calculate_variability(history: &ProsodyHistory) -> Variability {
    if history.len() < 2 {
        return Variability::default();
    }

    let mut period_sum = 0.0f64;
    let mut amplitude_sum = 0.0f64;
    let mut previous = None;
    for entry in history.iter() {
        if let Some((period, amplitude)) = previous {
            period_sum += (entry.period as f64 - period as f64).abs();
            amplitude_sum += (entry.amplitude as f64 - amplitude as f64).abs();
        }
        previous = Some((entry.period, entry.amplitude));
    }

    let pairs = (history.len() - 1) as f64;
    Variability {
        jitter: (period_sum / pairs) as f32,
        shimmer: (amplitude_sum / pairs) as f32,
    }
}
