//! Property tests for the analysis building blocks and the output cadence.

use proptest::prelude::*;
use prosody::analysis::{HistoryEntry, ProsodyHistory, SampleWindow, calculate_variability};
use prosody::config::EngineConfig;
use prosody::engine::{CollectorSink, ProsodyEngine};

proptest! {
    #[test]
    fn window_holds_the_most_recent_samples(
        blocks in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 0..300), 0..40),
        capacity in 8usize..512,
    ) {
        let mut window = SampleWindow::new(capacity);
        let mut stream: Vec<f32> = Vec::new();
        for block in &blocks {
            window.append(block);
            stream.extend_from_slice(block);
        }

        let mut expected = vec![0.0f32; capacity];
        let take = stream.len().min(capacity);
        expected[capacity - take..].copy_from_slice(&stream[stream.len() - take..]);

        let mut ordered = vec![0.0f32; capacity];
        window.copy_ordered(&mut ordered);
        prop_assert_eq!(ordered, expected);
        prop_assert_eq!(window.total_written(), stream.len() as u64);
    }

    #[test]
    fn history_never_exceeds_capacity(
        periods in prop::collection::vec(2usize..1000, 0..200),
        capacity in 1usize..64,
    ) {
        let mut history = ProsodyHistory::new(capacity);
        for &p in &periods {
            history.push(HistoryEntry::new(p, 0.5));
            prop_assert!(history.len() <= capacity);
        }
        prop_assert_eq!(history.len(), periods.len().min(capacity));

        // Oldest-to-newest order matches the tail of what was pushed.
        let kept: Vec<usize> = history.iter().map(|e| e.period).collect();
        let start = periods.len().saturating_sub(capacity);
        prop_assert_eq!(kept, periods[start..].to_vec());
    }

    #[test]
    fn variability_is_non_negative_and_zero_for_constant_history(
        entries in prop::collection::vec((2usize..1000, 0.0f32..1.0), 0..60),
    ) {
        let mut history = ProsodyHistory::new(50);
        for &(p, a) in &entries {
            history.push(HistoryEntry::new(p, a));
        }
        let v = calculate_variability(&history);
        prop_assert!(v.jitter >= 0.0);
        prop_assert!(v.shimmer >= 0.0);

        if let Some(&(p, a)) = entries.first() {
            let mut constant = ProsodyHistory::new(50);
            for _ in 0..entries.len() {
                constant.push(HistoryEntry::new(p, a));
            }
            let v = calculate_variability(&constant);
            prop_assert_eq!(v.jitter, 0.0);
            prop_assert_eq!(v.shimmer, 0.0);
        }
    }

    #[test]
    fn one_record_per_cycle_regardless_of_content(
        blocks in 0usize..400,
        missing_every in 1usize..10,
        level in 0.0f32..0.8,
    ) {
        // Small host keeps each cycle's lag search cheap.
        let config = EngineConfig {
            sample_rate: 8000,
            block_length: 80,
            window_size: 512,
            ..EngineConfig::default()
        };
        let mut engine = ProsodyEngine::new(config, CollectorSink::new()).unwrap();
        prop_assert_eq!(engine.frames_per_update(), 10);
        let block = vec![level; 80];
        for i in 0..blocks {
            if i % missing_every == 0 {
                engine.process_block(None);
            } else {
                engine.feed(&block);
            }
        }
        prop_assert_eq!(engine.sink().records().len(), blocks / 10);
        prop_assert_eq!(engine.stats().cycles, (blocks / 10) as u64);
    }

    #[test]
    fn frames_per_update_counts_whole_blocks_per_cycle(
        block_length in 1usize..1024,
        blocks_per_cycle in 1usize..200,
        update_rate_hz in 1u32..100,
    ) {
        // A host whose block rate is an exact multiple of the update rate.
        let sample_rate = block_length as u64 * blocks_per_cycle as u64 * update_rate_hz as u64;
        prop_assume!(sample_rate <= u32::MAX as u64);
        let config = EngineConfig {
            sample_rate: sample_rate as u32,
            block_length,
            update_rate_hz: update_rate_hz as f64,
            ..EngineConfig::default()
        };
        prop_assert_eq!(config.frames_per_update(), blocks_per_cycle);
    }

    #[test]
    fn frames_per_update_is_at_least_one(
        sample_rate in 1u32..192_000,
        block_length in 1usize..4096,
        update_rate_hz in 0.1f64..100_000.0,
    ) {
        let config = EngineConfig {
            sample_rate,
            block_length,
            update_rate_hz,
            ..EngineConfig::default()
        };
        prop_assert!(config.frames_per_update() >= 1);
    }
}

#[test]
fn fractional_update_rates_keep_whole_cycles() {
    // 48000 / 128 = 375 blocks per second.
    for (rate, expected) in [(0.3, 1250), (0.1, 3750), (0.6, 625), (2.5, 150)] {
        let config = EngineConfig {
            update_rate_hz: rate,
            ..EngineConfig::default()
        };
        assert_eq!(config.frames_per_update(), expected, "rate {}", rate);
    }
}
