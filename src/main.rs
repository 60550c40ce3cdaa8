// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use segment_mapper::app_config::{self, Config};
use segment_mapper::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align a translation against a marked source document
    Align(AlignArgs),

    /// Generate shell completions for segment-mapper
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Source JSON file: {"text": "...", "utterances": [[...], ...]}
    #[arg(value_name = "SOURCE_JSON")]
    source_path: PathBuf,

    /// Translated text file with the same (x) markers
    #[arg(value_name = "TRANSLATION_TXT")]
    translation_path: PathBuf,

    /// Write the JSON snapshot here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the event log as JSON
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Configuration file path; created with defaults if missing
    #[arg(short, long)]
    config_path: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'vi')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Characters per simulated stream chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Seed for chunk size jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// segment-mapper - streaming translation to utterance alignment
#[derive(Parser, Debug)]
#[command(name = "segment-mapper")]
#[command(version)]
#[command(about = "Align streamed translations with timed source utterances")]
#[command(long_about = "segment-mapper replays a translated text as a chunked stream, matches its (x)
markers to the markers of a source document and redistributes each translation
over the source utterances.

EXAMPLES:
    segment-mapper align source.json translation.txt              # Snapshot to stdout
    segment-mapper align source.json vi.txt -o snapshot.json      # Snapshot to a file
    segment-mapper align source.json vi.txt --chunk-size 40       # Smaller stream chunks
    segment-mapper completions bash > segment-mapper.bash         # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "segment-mapper", &mut std::io::stdout());
            Ok(())
        }
        Commands::Align(args) => {
            if let Err(e) = run_align(args).await {
                error!("Alignment failed: {:#}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn load_config(options: &AlignArgs) -> Result<Config> {
    let mut config = match &options.config_path {
        Some(config_path) if Path::new(config_path).exists() => Config::from_file(config_path)?,
        Some(config_path) => {
            warn!("Config file not found at '{}', creating default config.", config_path);
            let config = Config::default();
            config
                .save(config_path)
                .context(format!("Failed to write default config to file: {}", config_path))?;
            config
        }
        None => Config::default(),
    };

    // Override config with CLI options if provided
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(chunk_size) = options.chunk_size {
        config.simulation.chunk_size = chunk_size;
    }
    if let Some(seed) = options.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_align(options: AlignArgs) -> Result<()> {
    // If log level is set via command line, apply it before loading config
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(cmd_log_level.clone().into()));
    }

    let config = load_config(&options)?;
    log::set_max_level(level_filter(config.log_level));

    let controller = Controller::with_config(config)?.with_progress(!options.quiet);
    let stats = controller
        .run(
            options.source_path,
            options.translation_path,
            options.output,
            options.events,
        )
        .await?;

    info!(
        "Matched {} / merged {} / orphaned {} of {} markers ({:.1}% aligned)",
        stats.matched,
        stats.merged,
        stats.orphaned,
        stats.total,
        stats.success_rate() * 100.0
    );

    Ok(())
}
