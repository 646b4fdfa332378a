//! Configuration files driving engine construction.

use prosody::ProsodyError;
use prosody::config::{Config, OutputFormat};
use prosody::engine::{CollectorSink, ProsodyEngine};
use std::io::Write;

#[test]
fn engine_follows_file_settings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[engine]
update_rate_hz = 20.0
window_size = 1024
min_frequency_hz = 80.0

[output]
format = "text"
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.output.format, OutputFormat::Text);

    let engine = ProsodyEngine::new(config.engine.clone(), CollectorSink::new()).unwrap();
    // 48000 / 128 / 20 = 18.75
    assert_eq!(engine.frames_per_update(), 18);
    // floor(48000/400) = 120; ceil(48000/80) = 600 is capped at half the window
    assert_eq!(engine.lag_bounds().min_lag, 120);
    assert_eq!(engine.lag_bounds().max_lag, 512);
}

#[test]
fn invalid_values_are_rejected_at_construction() {
    let config = Config::from_toml(
        r#"
[engine]
min_frequency_hz = 300.0
max_frequency_hz = 100.0
"#,
    )
    .unwrap();

    match ProsodyEngine::new(config.engine, CollectorSink::new()) {
        Err(ProsodyError::ConfigInvalidValue { key, .. }) => {
            assert_eq!(key, "engine.max_frequency_hz");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("inverted frequency range was accepted"),
    }
}

#[test]
fn saved_default_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::default().save(&path).unwrap();
    let loaded = Config::load_or_default(&path).unwrap();
    assert_eq!(loaded, Config::default());
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&path),
        Err(ProsodyError::ConfigFileNotFound { .. })
    ));
    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
}
