//! Cycle outcomes and the records emitted to consumers.

use serde::{Deserialize, Serialize};

/// Pitch and variability reported by a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodyMetrics {
    /// Fundamental frequency in Hz.
    pub pitch: f32,
    /// Mean absolute period difference in samples.
    pub jitter: f32,
    /// Mean absolute peak-amplitude difference.
    pub shimmer: f32,
}

/// Result of one analysis cycle.
///
/// Every cycle ends in exactly one of these; none of them is an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Window below the silence threshold; history untouched.
    Silent { rms_db: f32 },
    /// Pitch found; history was updated before computing the metrics.
    Detected {
        metrics: ProsodyMetrics,
        period: usize,
        amplitude: f32,
        confidence: f32,
        rms_db: f32,
    },
    /// Voiced but no convincing pitch; carries the last detected metrics.
    Failed {
        last_known: Option<ProsodyMetrics>,
        rms_db: f32,
    },
}

impl CycleOutcome {
    pub fn rms_db(&self) -> f32 {
        match *self {
            CycleOutcome::Silent { rms_db }
            | CycleOutcome::Detected { rms_db, .. }
            | CycleOutcome::Failed { rms_db, .. } => rms_db,
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, CycleOutcome::Silent { .. })
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, CycleOutcome::Detected { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CycleOutcome::Failed { .. })
    }

    /// Metrics carried by this outcome, fresh or carried forward.
    pub fn metrics(&self) -> Option<ProsodyMetrics> {
        match *self {
            CycleOutcome::Silent { .. } => None,
            CycleOutcome::Detected { metrics, .. } => Some(metrics),
            CycleOutcome::Failed { last_known, .. } => last_known,
        }
    }

    pub fn to_record(&self) -> ProsodyRecord {
        ProsodyRecord::from(self)
    }
}

/// Message pushed downstream once per cycle.
///
/// Serializes to the camelCase shape consumers expect; `period`, `amplitude`
/// and `pitchDetectionFailed` are omitted when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsodyRecord {
    pub pitch: Option<f32>,
    pub jitter: Option<f32>,
    pub shimmer: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f32>,
    pub is_silent: bool,
    pub rms_db: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_detection_failed: Option<bool>,
}

impl From<&CycleOutcome> for ProsodyRecord {
    fn from(outcome: &CycleOutcome) -> Self {
        match *outcome {
            CycleOutcome::Silent { rms_db } => Self {
                pitch: None,
                jitter: None,
                shimmer: None,
                period: None,
                amplitude: None,
                is_silent: true,
                rms_db,
                pitch_detection_failed: None,
            },
            CycleOutcome::Detected {
                metrics,
                period,
                amplitude,
                rms_db,
                ..
            } => Self {
                pitch: Some(metrics.pitch),
                jitter: Some(metrics.jitter),
                shimmer: Some(metrics.shimmer),
                period: Some(period),
                amplitude: Some(amplitude),
                is_silent: false,
                rms_db,
                pitch_detection_failed: None,
            },
            CycleOutcome::Failed { last_known, rms_db } => Self {
                pitch: last_known.map(|m| m.pitch),
                jitter: last_known.map(|m| m.jitter),
                shimmer: last_known.map(|m| m.shimmer),
                period: None,
                amplitude: None,
                is_silent: false,
                rms_db,
                pitch_detection_failed: Some(true),
            },
        }
    }
}

impl From<CycleOutcome> for ProsodyRecord {
    fn from(outcome: CycleOutcome) -> Self {
        Self::from(&outcome)
    }
}
