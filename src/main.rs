use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use prosody::audio::{BlockSource, ToneGenerator, WavBlockSource};
use prosody::cli::{Cli, Commands, ConfigAction, FormatArg};
use prosody::config::{Config, EngineConfig, OutputFormat};
use prosody::engine::{
    EmissionStats, EngineSession, JsonLinesSink, LogReporter, ProsodyEngine, RecordSink,
};
use prosody::output::{TextSink, format_summary};
use std::io::{BufWriter, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(version = %prosody::version_string(), "prosody starting");

    match cli.command {
        Commands::Analyze {
            input,
            format,
            block_length,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut source = if input.as_os_str() == "-" {
                WavBlockSource::from_stdin()?
            } else {
                WavBlockSource::open(&input)
                    .with_context(|| format!("cannot analyze {}", input.display()))?
            };
            let block_length = block_length.unwrap_or(config.engine.block_length);
            source = source.with_block_length(block_length);

            let engine_config = EngineConfig {
                sample_rate: source.sample_rate(),
                block_length,
                ..config.engine.clone()
            };
            let format = resolve_format(format, config.output.format);
            run(engine_config, format, &mut source, cli.quiet)?;
        }
        Commands::Tone {
            freq,
            amplitude,
            duration,
            format,
            realtime,
        } => {
            let config = load_config(cli.config.as_deref())?;
            if !(0.0..=1.0).contains(&amplitude) {
                bail!("amplitude must be in [0, 1], got {}", amplitude);
            }
            let mut tone = ToneGenerator::new(
                freq,
                amplitude,
                config.engine.sample_rate,
                config.engine.block_length,
            )
            .with_duration(duration);
            let format = resolve_format(format, config.output.format);
            if realtime {
                run_realtime(&config, format, &mut tone, cli.quiet)?;
            } else {
                run(config.engine.clone(), format, &mut tone, cli.quiet)?;
            }
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "prosody", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `PROSODY_LOG` (or `RUST_LOG`) wins over the `-v` count.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("PROSODY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config), which must exist
/// 2. Default config path (~/.config/prosody/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

fn resolve_format(arg: Option<FormatArg>, configured: OutputFormat) -> OutputFormat {
    match arg {
        Some(FormatArg::Json) => OutputFormat::Json,
        Some(FormatArg::Text) => OutputFormat::Text,
        None => configured,
    }
}

/// Stdout sink for `format`.
fn stdout_sink(config: &EngineConfig, format: OutputFormat) -> Box<dyn RecordSink> {
    let stdout = std::io::stdout();
    let cycle_secs =
        (config.frames_per_update() * config.block_length) as f64 / config.sample_rate as f64;

    match format {
        OutputFormat::Json => Box::new(JsonLinesSink::new(BufWriter::new(stdout))),
        OutputFormat::Text => {
            let color = stdout.is_terminal();
            Box::new(TextSink::new(BufWriter::new(stdout), cycle_secs, color))
        }
    }
}

fn print_summary(stats: &EmissionStats, elapsed: Duration) {
    let summary = format_summary(stats, elapsed);
    if std::io::stderr().is_terminal() {
        eprintln!("{}", summary.dimmed());
    } else {
        eprintln!("{}", summary);
    }
}

/// Drive `source` through a fresh engine, printing records to stdout.
fn run<B: BlockSource>(
    config: EngineConfig,
    format: OutputFormat,
    source: &mut B,
    quiet: bool,
) -> Result<()> {
    let sink = stdout_sink(&config, format);
    let sample_rate = config.sample_rate;
    let mut engine = ProsodyEngine::new(config, sink)?;
    let blocks = engine.run_source(source)?;
    let stats = engine.stats();
    let block_length = source.block_length();
    engine.finish().context("failed to flush output")?;

    if !quiet {
        let elapsed =
            Duration::from_secs_f64((blocks * block_length as u64) as f64 / sample_rate as f64);
        print_summary(&stats, elapsed);
    }

    Ok(())
}

/// Feed `source` to a threaded session at the host's block rate and print
/// records as they arrive.
fn run_realtime<B: BlockSource>(
    config: &Config,
    format: OutputFormat,
    source: &mut B,
    quiet: bool,
) -> Result<()> {
    let mut sink = stdout_sink(&config.engine, format);
    let block_period = Duration::from_secs_f64(
        config.engine.block_length as f64 / config.engine.sample_rate as f64,
    );

    let mut session = EngineSession::from_config(config, Arc::new(LogReporter))?;
    let records = session.records();
    let started = Instant::now();
    let mut blocks = 0u64;

    while let Some(block) = source.next_block()? {
        session.push_owned(block);
        blocks += 1;
        for record in records.try_iter() {
            sink.handle(&record)?;
        }
        let due = started + block_period.mul_f64(blocks as f64);
        if let Some(wait) = due.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    let summary = session.stop()?;
    for record in records.try_iter() {
        sink.handle(&record)?;
    }
    sink.finish().context("failed to flush output")?;

    if summary.blocks_dropped > 0 || summary.records_dropped > 0 {
        tracing::warn!(
            blocks_dropped = summary.blocks_dropped,
            records_dropped = summary.records_dropped,
            "session fell behind"
        );
    }
    if !quiet {
        print_summary(&summary.stats, started.elapsed());
    }

    Ok(())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save(&config_path)?;
            println!("Wrote {}", config_path.display());
        }
    }

    Ok(())
}
