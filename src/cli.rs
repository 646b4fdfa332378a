//! Command-line interface for prosody
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Real-time pitch, jitter and shimmer analysis
#[derive(Parser, Debug)]
#[command(
    name = "prosody",
    version,
    about = "Real-time pitch, jitter and shimmer analysis"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print records, no summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Record output format on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// One JSON object per line
    Json,
    /// Aligned human-readable columns
    Text,
}

/// Parse a duration string into seconds.
///
/// Supports any duration format accepted by `humantime` (`500ms`, `2s`,
/// `1m30s`) as well as bare numbers, which are taken as seconds.
pub fn parse_duration_secs(s: &str) -> Result<f64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<f64>() {
        if secs.is_finite() && secs >= 0.0 {
            return Ok(secs);
        }
        return Err(format!("invalid duration: {}", s));
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs_f64())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a WAV file (use '-' for stdin) and print one record per cycle
    Analyze {
        /// WAV file to analyze
        #[arg(value_name = "WAV")]
        input: PathBuf,

        /// Output format (default: from config)
        #[arg(long, short = 'f', value_enum, value_name = "FORMAT")]
        format: Option<FormatArg>,

        /// Samples per host block
        #[arg(long, value_name = "SAMPLES")]
        block_length: Option<usize>,
    },

    /// Run the engine on a synthetic sine tone
    Tone {
        /// Tone frequency in Hz
        #[arg(long, value_name = "HZ", default_value = "220")]
        freq: f64,

        /// Peak amplitude in [0, 1]
        #[arg(long, value_name = "AMP", default_value = "0.5")]
        amplitude: f32,

        /// Length of the tone. Examples: 500ms, 2s, 1m
        #[arg(long, short = 'd', value_name = "DURATION", default_value = "1s", value_parser = parse_duration_secs)]
        duration: f64,

        /// Output format (default: from config)
        #[arg(long, short = 'f', value_enum, value_name = "FORMAT")]
        format: Option<FormatArg>,

        /// Pace blocks at the host rate through a threaded engine session
        #[arg(long)]
        realtime: bool,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file + environment)
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
