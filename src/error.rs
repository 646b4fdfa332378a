//! Error types for prosody.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProsodyError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio input errors
    #[error("Audio format unsupported: {message}")]
    AudioFormat { message: String },

    #[error("Audio input failed: {message}")]
    AudioInput { message: String },

    // Output errors
    #[error("Record channel closed: {sink}")]
    ChannelClosed { sink: String },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ProsodyError {
    /// Shorthand for a rejected configuration value.
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::ConfigInvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ProsodyError>;
