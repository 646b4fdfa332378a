use crate::defaults;
use crate::error::{ProsodyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

/// Per-session engine parameters.
///
/// Fixed when the engine is constructed; changing them means building a new engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Host sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per host block.
    pub block_length: usize,
    /// Ring buffer size analysed each cycle.
    pub window_size: usize,
    /// Number of successful detections kept for jitter/shimmer.
    pub history_capacity: usize,
    /// Lowest fundamental frequency searched (Hz).
    pub min_frequency_hz: f64,
    /// Highest fundamental frequency searched (Hz).
    pub max_frequency_hz: f64,
    /// Windows below this level (dBFS) are silent.
    pub silence_threshold_db: f64,
    /// Records emitted per second.
    pub update_rate_hz: f64,
    /// Minimum normalized autocorrelation peak for a detection.
    pub confidence_threshold: f64,
}

/// Record output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Capacity of the engine → consumer channel.
    pub channel_capacity: usize,
    /// Rendering used by the CLI.
    pub format: OutputFormat,
}

/// How the CLI renders records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            block_length: defaults::BLOCK_LENGTH,
            window_size: defaults::WINDOW_SIZE,
            history_capacity: defaults::HISTORY_CAPACITY,
            min_frequency_hz: defaults::MIN_FREQUENCY_HZ,
            max_frequency_hz: defaults::MAX_FREQUENCY_HZ,
            silence_threshold_db: defaults::SILENCE_THRESHOLD_DB,
            update_rate_hz: defaults::UPDATE_RATE_HZ,
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            channel_capacity: defaults::RECORD_CHANNEL_CAPACITY,
            format: OutputFormat::Json,
        }
    }
}

impl EngineConfig {
    /// Configuration for a host running at `sample_rate` with `block_length` blocks.
    pub fn for_host(sample_rate: u32, block_length: usize) -> Self {
        Self {
            sample_rate,
            block_length,
            ..Self::default()
        }
    }

    /// Reject parameter combinations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ProsodyError::invalid("engine.sample_rate", "must be positive"));
        }
        if self.block_length == 0 {
            return Err(ProsodyError::invalid("engine.block_length", "must be positive"));
        }
        if self.window_size < 2 * defaults::MIN_LAG + 4 {
            return Err(ProsodyError::invalid(
                "engine.window_size",
                format!("must be at least {}", 2 * defaults::MIN_LAG + 4),
            ));
        }
        if self.history_capacity == 0 {
            return Err(ProsodyError::invalid(
                "engine.history_capacity",
                "must be positive",
            ));
        }
        if !(self.min_frequency_hz.is_finite() && self.min_frequency_hz > 0.0) {
            return Err(ProsodyError::invalid(
                "engine.min_frequency_hz",
                "must be a positive number",
            ));
        }
        if !(self.max_frequency_hz.is_finite() && self.max_frequency_hz > self.min_frequency_hz)
        {
            return Err(ProsodyError::invalid(
                "engine.max_frequency_hz",
                format!("must be greater than min_frequency_hz ({})", self.min_frequency_hz),
            ));
        }
        if !self.silence_threshold_db.is_finite() {
            return Err(ProsodyError::invalid(
                "engine.silence_threshold_db",
                "must be a finite number",
            ));
        }
        if !(self.update_rate_hz.is_finite() && self.update_rate_hz > 0.0) {
            return Err(ProsodyError::invalid(
                "engine.update_rate_hz",
                "must be a positive number",
            ));
        }
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            return Err(ProsodyError::invalid(
                "engine.confidence_threshold",
                "must be in [0, 1)",
            ));
        }
        Ok(())
    }

    /// Number of host blocks between two analysis cycles.
    ///
    /// `floor(sample_rate / block_length / update_rate_hz)`, never below one.
    pub fn frames_per_update(&self) -> usize {
        let blocks_per_second = self.sample_rate as f64 / self.block_length as f64;
        let frames = (blocks_per_second / self.update_rate_hz).floor();
        (frames as usize).max(1)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProsodyError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ProsodyError::Io(e)
            }
        })?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ProsodyError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PROSODY_SILENCE_THRESHOLD_DB → engine.silence_threshold_db
    /// - PROSODY_UPDATE_RATE_HZ → engine.update_rate_hz
    /// - PROSODY_WINDOW_SIZE → engine.window_size
    ///
    /// Empty or unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(db) = env_value::<f64>("PROSODY_SILENCE_THRESHOLD_DB") {
            self.engine.silence_threshold_db = db;
        }

        if let Some(rate) = env_value::<f64>("PROSODY_UPDATE_RATE_HZ") {
            self.engine.update_rate_hz = rate;
        }

        if let Some(size) = env_value::<usize>("PROSODY_WINDOW_SIZE") {
            self.engine.window_size = size;
        }

        self
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ProsodyError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/prosody/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prosody")
            .join("config.toml")
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    if raw.is_empty() {
        return None;
    }
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
