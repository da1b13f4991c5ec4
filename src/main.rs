// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use autocaption::app_config::{self, Config};
use autocaption::app_controller::Controller;
use autocaption::recognition::Task;

/// CLI Wrapper for Task to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTask {
    /// Transcribe speech in its spoken language
    Transcribe,
    /// Translate speech into English
    Translate,
}

impl From<CliTask> for Task {
    fn from(cli_task: CliTask) -> Self {
        match cli_task {
            CliTask::Transcribe => Task::Transcribe,
            CliTask::Translate => Task::Translate,
        }
    }
}

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
    /// Generate captions for a video file or a directory of videos (default command)
    Caption(CaptionArgs),

    /// Generate shell completions for autocaption
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CaptionArgs {
    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// What the recognition engine should do with the speech
    #[arg(short, long, value_enum, default_value = "transcribe")]
    task: CliTask,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Directory receiving the results (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Recognition model name (e.g. 'tiny', 'small', 'medium')
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum characters per caption line
    #[arg(short = 'w', long)]
    max_line_width: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// autocaption - captions for videos from speech recognition
///
/// Extracts the audio track, recognizes the speech, and produces a
/// transcript, WebVTT and SRT captions, a video with burned-in subtitles,
/// and a zip archive holding all of them.
#[derive(Parser, Debug)]
#[command(name = "autocaption")]
#[command(version)]
#[command(about = "Automatic video captioning")]
#[command(long_about = "autocaption recognizes the speech in a video and produces captions and a subtitled copy.

EXAMPLES:
    autocaption talk.mp4                          # Transcribe using default config
    autocaption -t translate interview.mkv        # Captions translated into English
    autocaption -m medium -w 42 talk.mp4          # Larger model, narrower caption lines
    autocaption -o out/ /videos/                  # Process an entire directory
    autocaption completions bash > autocaption.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

OUTPUTS (next to the input unless --output-dir is given; <file> keeps its extension):
    <file>.txt, <file>.vtt, <file>.srt
    <file>_subtitled.mp4
    <file>_transcripts_and_video.zip
    Folder runs with --output-dir mirror the input subdirectories.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// What the recognition engine should do with the speech
    #[arg(short, long, value_enum, default_value = "transcribe")]
    task: CliTask,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Directory receiving the results (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Recognition model name (e.g. 'tiny', 'small', 'medium')
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum characters per caption line
    #[arg(short = 'w', long)]
    max_line_width: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
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

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The global max level is lowered after config load
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "autocaption", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Caption(args)) => run_caption(args).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let caption_args = CaptionArgs {
                input_path,
                task: cli.task,
                force_overwrite: cli.force_overwrite,
                output_dir: cli.output_dir,
                model: cli.model,
                max_line_width: cli.max_line_width,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_caption(caption_args).await
        }
    }
}

async fn run_caption(options: CaptionArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Command line options win over the file
    if let Some(model) = &options.model {
        config.recognition.model = model.clone();
    }
    if let Some(width) = options.max_line_width {
        config.captions.max_line_width = width;
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = Some(output_dir.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    let task: Task = options.task.into();

    if options.input_path.is_file() {
        controller
            .run(&options.input_path, task, options.force_overwrite)
            .await?;
    } else if options.input_path.is_dir() {
        let summary = controller
            .run_folder(&options.input_path, task, options.force_overwrite)
            .await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}
