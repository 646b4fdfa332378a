//! Signal analysis building blocks.
//!
//! Each piece works on plain slices and owns preallocated storage, so the
//! engine can drive them from a real-time callback:
//! ```text
//! blocks ─▶ SampleWindow ─▶ SilenceClassifier ─▶ PitchEstimator ─▶ ProsodyHistory ─▶ jitter/shimmer
//! ```

pub mod history;
pub mod pitch;
pub mod silence;
pub mod variability;
pub mod window;

pub use history::{HistoryEntry, ProsodyHistory, peak_amplitude};
pub use pitch::{LagBounds, PitchEstimate, PitchEstimator, autocorrelation};
pub use silence::{Loudness, SilenceClassifier, calculate_rms, rms_to_db};
pub use variability::{Variability, calculate_variability};
pub use window::SampleWindow;
