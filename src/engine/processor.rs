//! The prosody engine: one instance per audio session.
//!
//! Owns every buffer it needs, sized once from the session configuration.
//! Per block it only copies samples and counts; every `frames_per_update`
//! blocks it runs one analysis cycle and emits exactly one record.

use crate::analysis::history::{HistoryEntry, ProsodyHistory};
use crate::audio::source::BlockSource;
use crate::analysis::pitch::{LagBounds, PitchEstimator};
use crate::analysis::silence::SilenceClassifier;
use crate::analysis::variability::calculate_variability;
use crate::analysis::window::SampleWindow;
use crate::config::EngineConfig;
use crate::engine::error::StationError;
use crate::engine::record::{CycleOutcome, ProsodyMetrics};
use crate::engine::scheduler::{EmissionStats, OutputScheduler};
use crate::engine::sink::RecordSink;
use crate::engine::station::Station;
use crate::error::Result;

/// A host block as delivered over a channel.
///
/// An empty `samples` vector stands for a callback that fired without input.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    pub sequence: u64,
    pub samples: Vec<f32>,
}

impl AudioBlock {
    pub fn new(sequence: u64, samples: Vec<f32>) -> Self {
        Self { sequence, samples }
    }

    /// A callback tick that carried no input.
    pub fn missing(sequence: u64) -> Self {
        Self {
            sequence,
            samples: Vec::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Real-time pitch/jitter/shimmer extractor.
pub struct ProsodyEngine<S: RecordSink> {
    config: EngineConfig,
    window: SampleWindow,
    /// Chronological copy of `window`, reused every cycle.
    scratch: Box<[f32]>,
    classifier: SilenceClassifier,
    estimator: PitchEstimator,
    history: ProsodyHistory,
    last_known: Option<ProsodyMetrics>,
    scheduler: OutputScheduler<S>,
    blocks_seen: u64,
    /// Non-empty blocks whose length differed from `config.block_length`.
    length_mismatches: u64,
}

impl<S: RecordSink> ProsodyEngine<S> {
    /// Builds an engine for one session, emitting into `sink`.
    pub fn new(config: EngineConfig, sink: S) -> Result<Self> {
        config.validate()?;

        let estimator = PitchEstimator::new(&config);
        let frames_per_update = config.frames_per_update();
        let bounds = estimator.bounds();
        tracing::info!(
            sample_rate = config.sample_rate,
            block_length = config.block_length,
            window_size = config.window_size,
            frames_per_update,
            min_lag = bounds.min_lag,
            max_lag = bounds.max_lag,
            sink = sink.name(),
            "prosody engine ready"
        );
        if bounds.is_empty() {
            tracing::warn!(
                "lag search range is empty; every voiced cycle will report a failed detection"
            );
        }

        Ok(Self {
            window: SampleWindow::new(config.window_size),
            scratch: vec![0.0; config.window_size].into_boxed_slice(),
            classifier: SilenceClassifier::new(config.silence_threshold_db),
            estimator,
            history: ProsodyHistory::new(config.history_capacity),
            last_known: None,
            scheduler: OutputScheduler::new(frames_per_update, sink),
            blocks_seen: 0,
            length_mismatches: 0,
            config,
        })
    }

    /// Handles one host callback.
    ///
    /// `None` or an empty slice means the callback carried no input: the
    /// window keeps its contents but the block still counts towards the
    /// cadence. Returns the outcome when this block completed a cycle.
    pub fn process_block(&mut self, block: Option<&[f32]>) -> Option<CycleOutcome> {
        self.blocks_seen += 1;
        if let Some(samples) = block {
            if !samples.is_empty() && samples.len() != self.config.block_length {
                self.length_mismatches += 1;
            }
            let was_primed = self.window.is_primed();
            self.window.append(samples);
            if !was_primed && self.window.is_primed() {
                tracing::debug!(blocks = self.blocks_seen, "analysis window filled");
            }
        }

        if !self.scheduler.tick() {
            return None;
        }

        let outcome = self.run_cycle();
        self.scheduler.emit(&outcome);
        Some(outcome)
    }

    /// Convenience for `process_block(Some(samples))`.
    pub fn feed(&mut self, samples: &[f32]) -> Option<CycleOutcome> {
        self.process_block(Some(samples))
    }

    /// Feeds every block of `source` through the engine. Returns the number
    /// of blocks consumed.
    pub fn run_source<B: BlockSource + ?Sized>(&mut self, source: &mut B) -> Result<u64> {
        if source.sample_rate() != self.config.sample_rate {
            tracing::warn!(
                source = source.sample_rate(),
                engine = self.config.sample_rate,
                "source sample rate differs from engine configuration"
            );
        }
        let mut blocks = 0;
        while let Some(block) = source.next_block()? {
            self.feed(&block);
            blocks += 1;
        }
        Ok(blocks)
    }

    /// Analyses the current window once.
    fn run_cycle(&mut self) -> CycleOutcome {
        self.window.copy_ordered(&mut self.scratch);
        let window = &self.scratch[..];

        let loudness = self.classifier.classify(window);
        if loudness.is_silent {
            return CycleOutcome::Silent {
                rms_db: loudness.db,
            };
        }

        let Some(estimate) = self.estimator.estimate(window) else {
            return CycleOutcome::Failed {
                last_known: self.last_known,
                rms_db: loudness.db,
            };
        };

        let entry = HistoryEntry::from_window(window, estimate.lag);
        self.history.push(entry);
        let variability = calculate_variability(&self.history);

        let metrics = ProsodyMetrics {
            pitch: estimate.frequency_hz,
            jitter: variability.jitter,
            shimmer: variability.shimmer,
        };
        self.last_known = Some(metrics);

        CycleOutcome::Detected {
            metrics,
            period: entry.period,
            amplitude: entry.amplitude,
            confidence: estimate.confidence,
            rms_db: loudness.db,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lag_bounds(&self) -> LagBounds {
        self.estimator.bounds()
    }

    pub fn frames_per_update(&self) -> usize {
        self.scheduler.frames_per_update()
    }

    pub fn history(&self) -> &ProsodyHistory {
        &self.history
    }

    /// Metrics of the most recent successful detection.
    pub fn last_known(&self) -> Option<ProsodyMetrics> {
        self.last_known
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn blocks_seen(&self) -> u64 {
        self.blocks_seen
    }

    /// Blocks that carried samples but not `block_length` of them.
    ///
    /// They are still appended in full; only the count is kept.
    pub fn length_mismatches(&self) -> u64 {
        self.length_mismatches
    }

    pub fn stats(&self) -> EmissionStats {
        self.scheduler.stats()
    }

    pub fn sink(&self) -> &S {
        self.scheduler.sink()
    }

    /// Flushes the sink and hands it back.
    pub fn finish(mut self) -> Result<S> {
        self.scheduler.sink_mut().finish()?;
        Ok(self.scheduler.into_sink())
    }
}

impl<S: RecordSink> Station for ProsodyEngine<S> {
    type Input = AudioBlock;

    fn process(&mut self, block: AudioBlock) -> std::result::Result<(), StationError> {
        let mismatches = self.length_mismatches;
        self.process_block(Some(&block.samples));
        if self.scheduler.is_sink_closed() {
            return Err(StationError::Fatal(format!(
                "record sink '{}' refused output at block {}",
                self.scheduler.sink().name(),
                block.sequence
            )));
        }
        // Only the first mismatch of a session is reported.
        if mismatches == 0 && self.length_mismatches == 1 {
            return Err(StationError::Recoverable(format!(
                "block {} carried {} samples, expected {}",
                block.sequence,
                block.samples.len(),
                self.config.block_length
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "prosody"
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.scheduler.sink_mut().finish() {
            tracing::warn!(error = %e, "failed to finish record sink");
        }
        let stats = self.scheduler.stats();
        tracing::info!(
            blocks = self.blocks_seen,
            length_mismatches = self.length_mismatches,
            cycles = stats.cycles,
            emitted = stats.emitted,
            failed = stats.failed,
            "prosody engine stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sink::CollectorSink;

    fn engine() -> ProsodyEngine<CollectorSink> {
        ProsodyEngine::new(EngineConfig::default(), CollectorSink::new()).unwrap()
    }

    fn sine_block(freq: f64, start: u64, len: usize) -> Vec<f32> {
        (0..len as u64)
            .map(|i| {
                let n = (start + i) as f64;
                (0.5 * (2.0 * std::f64::consts::PI * freq * n / 48000.0).sin()) as f32
            })
            .collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            update_rate_hz: -1.0,
            ..EngineConfig::default()
        };
        assert!(ProsodyEngine::new(config, CollectorSink::new()).is_err());
    }

    #[test]
    fn test_precomputed_parameters() {
        let engine = engine();
        assert_eq!(engine.frames_per_update(), 37);
        assert_eq!(engine.lag_bounds().min_lag, 120);
        assert_eq!(engine.lag_bounds().max_lag, 960);
        assert_eq!(engine.history().capacity(), 50);
    }

    #[test]
    fn test_no_output_before_cadence() {
        let mut engine = engine();
        for _ in 0..36 {
            assert!(engine.feed(&[0.0; 128]).is_none());
        }
        assert!(engine.sink().records().is_empty());
        assert!(engine.feed(&[0.0; 128]).is_some());
        assert_eq!(engine.sink().records().len(), 1);
    }

    #[test]
    fn test_zero_blocks_emit_silence() {
        let mut engine = engine();
        let mut outcomes = Vec::new();
        for _ in 0..37 {
            outcomes.extend(engine.feed(&[0.0; 128]));
        }
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_silent());

        let record = engine.sink().records()[0];
        assert!(record.is_silent);
        assert_eq!(record.pitch, None);
        assert_eq!(record.jitter, None);
        assert_eq!(record.shimmer, None);
        assert!(record.rms_db.is_finite());
        assert!(record.rms_db < -100.0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_missing_blocks_count_towards_cadence() {
        let mut engine = engine();
        for _ in 0..36 {
            assert!(engine.process_block(None).is_none());
        }
        let outcome = engine.process_block(Some(&[])).unwrap();
        assert!(outcome.is_silent());
        assert_eq!(engine.window().total_written(), 0);
    }

    #[test]
    fn test_sine_first_cycle_detects_pitch() {
        let mut engine = engine();
        let mut outcome = None;
        for b in 0..37u64 {
            outcome = engine.feed(&sine_block(220.0, b * 128, 128));
        }
        let outcome = outcome.unwrap();
        let metrics = outcome.metrics().unwrap();

        assert!(outcome.is_detected());
        assert!((metrics.pitch - 220.0).abs() / 220.0 < 0.01);
        assert_eq!(metrics.jitter, 0.0);
        assert_eq!(metrics.shimmer, 0.0);

        let record = engine.sink().records()[0];
        assert!(!record.is_silent);
        assert_eq!(record.pitch_detection_failed, None);
        assert_eq!(record.period, Some(218));
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.last_known(), Some(metrics));
    }

    #[test]
    fn test_silence_does_not_touch_history() {
        let mut engine = engine();
        for b in 0..37u64 {
            engine.feed(&sine_block(220.0, b * 128, 128));
        }
        assert_eq!(engine.history().len(), 1);

        // Long enough for the window to be fully zero at the next cycle.
        for _ in 0..37 {
            engine.feed(&[0.0; 128]);
        }
        let records = engine.sink().records();
        assert_eq!(records.len(), 2);
        assert!(records[1].is_silent);
        assert_eq!(engine.history().len(), 1);
        assert!(engine.last_known().is_some());
    }

    #[test]
    fn test_failed_detection_carries_last_known() {
        let mut engine = engine();
        for b in 0..37u64 {
            engine.feed(&sine_block(220.0, b * 128, 128));
        }
        let detected = engine.last_known().unwrap();

        // Loud aperiodic window: one impulse per window length, far outside
        // the lag range, so nothing correlates but the level is above the gate.
        let mut block = vec![0.0f32; 128];
        block[0] = 1.0;
        let silent_block = [0.0f32; 128];
        let mut outcome = None;
        for b in 0..37 {
            outcome = if b == 30 {
                engine.feed(&block)
            } else {
                engine.feed(&silent_block)
            };
        }
        let outcome = outcome.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Failed {
                last_known: Some(detected),
                rms_db: outcome.rms_db(),
            }
        );
        let record = engine.sink().records()[1];
        assert_eq!(record.pitch, Some(detected.pitch));
        assert_eq!(record.pitch_detection_failed, Some(true));
        assert!(!record.is_silent);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_station_process_feeds_engine() {
        let mut engine = engine();
        for seq in 0..37 {
            Station::process(&mut engine, AudioBlock::new(seq, vec![0.0; 128])).unwrap();
        }
        assert_eq!(engine.stats().emitted, 1);
        assert_eq!(engine.blocks_seen(), 37);
    }

    #[test]
    fn test_odd_sized_blocks_are_counted_and_still_appended() {
        let mut engine = engine();
        engine.feed(&[0.1; 128]);
        engine.feed(&[0.1; 64]);
        engine.feed(&[]);
        engine.process_block(None);
        engine.feed(&[0.1; 300]);

        assert_eq!(engine.length_mismatches(), 2);
        assert_eq!(engine.window().total_written(), 128 + 64 + 300);
        assert_eq!(engine.blocks_seen(), 5);
    }

    #[test]
    fn test_window_primes_after_capacity_samples() {
        let mut engine = engine();
        for _ in 0..15 {
            engine.feed(&[0.0; 128]);
        }
        assert!(!engine.window().is_primed());
        engine.feed(&[0.0; 128]);
        assert!(engine.window().is_primed());
    }

    #[test]
    fn test_station_reports_first_length_mismatch_only() {
        use crate::engine::error::ErrorReporter;
        use crate::engine::station::StationRunner;
        use std::sync::{Arc, Mutex};

        #[derive(Default)]
        struct Collected(Mutex<Vec<StationError>>);

        impl ErrorReporter for Collected {
            fn report(&self, _station: &str, error: &StationError) {
                self.0.lock().unwrap().push(error.clone());
            }
        }

        let reporter = Arc::new(Collected::default());
        let (tx, rx) = crossbeam_channel::bounded(8);
        let runner = StationRunner::spawn(engine(), rx, reporter.clone());

        tx.send(AudioBlock::new(0, vec![0.0; 128])).unwrap();
        tx.send(AudioBlock::new(1, vec![0.0; 64])).unwrap();
        tx.send(AudioBlock::missing(2)).unwrap();
        tx.send(AudioBlock::new(3, vec![0.0; 256])).unwrap();
        tx.send(AudioBlock::new(4, vec![0.0; 128])).unwrap();
        drop(tx);

        let engine = runner.join().unwrap();
        assert_eq!(engine.blocks_seen(), 5);
        assert_eq!(engine.length_mismatches(), 2);
        assert_eq!(engine.window().total_written(), 128 + 64 + 256 + 128);

        let errors = reporter.0.lock().unwrap();
        assert_eq!(
            *errors,
            vec![StationError::Recoverable(
                "block 1 carried 64 samples, expected 128".to_string()
            )]
        );
    }

    #[test]
    fn test_finish_returns_sink() {
        let mut engine = engine();
        for _ in 0..74 {
            engine.feed(&[0.0; 128]);
        }
        let sink = engine.finish().unwrap();
        assert_eq!(sink.into_records().len(), 2);
    }

    #[test]
    fn test_run_source_consumes_tone() {
        use crate::audio::tone::ToneGenerator;

        let mut engine = engine();
        let mut tone = ToneGenerator::new(220.0, 0.5, 48000, 128).with_block_limit(37);
        assert_eq!(engine.run_source(&mut tone).unwrap(), 37);
        assert_eq!(engine.stats().emitted, 1);
        assert_eq!(engine.sink().records()[0].period, Some(218));
    }

    #[test]
    fn test_audio_block_missing() {
        let block = AudioBlock::missing(3);
        assert!(block.is_missing());
        assert_eq!(block.sequence, 3);
        assert!(!AudioBlock::new(0, vec![0.1]).is_missing());
    }
}
